//! Microsoft SQL Server dialect.

use super::{AutoIncrement, DefaultLiteral, Dialect, Environment, LimitStyle, TypeInfo};
use crate::entry::DataType;

impl Dialect {
    /// Microsoft SQL Server.
    #[must_use]
    pub fn mssql() -> Self {
        Self::new("MsSQL", Environment::Remote)
            .with_protocol("sqlserver")
            .with_default_port(1433)
            .with_quotes('[', ']')
            .with_auto_increment(AutoIncrement::Keyword(String::from(" IDENTITY(1,1)")))
            .with_default_literal(DefaultLiteral::Inline)
            .with_limit_style(LimitStyle::OffsetFetch)
            .with_type(DataType::Double, TypeInfo::sizeable("DOUBLE"))
            .with_type(DataType::Float, TypeInfo::sizeable("REAL"))
            .with_type(DataType::Decimal, TypeInfo::sizeable("DECIMAL"))
            .with_type(DataType::Integer, TypeInfo::sizeable("INTEGER"))
            .with_type(DataType::Long, TypeInfo::sized("BIGINT", 8))
            .with_type(DataType::Char, TypeInfo::sized("CHAR", 1))
            .with_type(DataType::String, TypeInfo::sized("VARCHAR", 255))
            .with_type(DataType::LongText, TypeInfo::fixed("LONGTEXT"))
            .with_type(DataType::Document, TypeInfo::fixed("LONGTEXT"))
            .with_type(DataType::Date, TypeInfo::sizeable("DATE"))
            .with_type(DataType::DateTime, TypeInfo::sizeable("DATETIME"))
            .with_type(DataType::Timestamp, TypeInfo::sizeable("TIMESTAMP"))
            .with_type(DataType::Binary, TypeInfo::sizeable("BINARY"))
            .with_type(DataType::Uuid, TypeInfo::sized("BINARY", 16))
            .with_type(DataType::Boolean, TypeInfo::fixed("BIT"))
    }
}
