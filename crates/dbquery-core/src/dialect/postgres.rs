//! PostgreSQL dialect.

use super::{AutoIncrement, DefaultLiteral, Dialect, Environment, IndexStyle, TypeInfo};
use crate::entry::DataType;

impl Dialect {
    /// PostgreSQL.
    ///
    /// Auto-increment columns become `SERIAL`/`BIGSERIAL`, defaults are
    /// inlined and indexes are created by separate statements.
    #[must_use]
    pub fn postgresql() -> Self {
        Self::new("PostgreSQL", Environment::Remote)
            .with_protocol("postgresql")
            .with_default_port(5432)
            .with_quotes('"', '"')
            .with_auto_increment(AutoIncrement::Serial)
            .with_default_literal(DefaultLiteral::Inline)
            .with_index_style(IndexStyle::Separate)
            .with_primary_key_unique(true)
            .with_type(DataType::Double, TypeInfo::sizeable("DOUBLE PRECISION"))
            .with_type(DataType::Float, TypeInfo::sizeable("FLOAT"))
            .with_type(DataType::Decimal, TypeInfo::sizeable("DECIMAL"))
            .with_type(DataType::Integer, TypeInfo::sizeable("INTEGER"))
            .with_type(DataType::Long, TypeInfo::fixed("BIGINT"))
            .with_type(DataType::Char, TypeInfo::sized("CHAR", 1))
            .with_type(DataType::String, TypeInfo::sized("VARCHAR", 255))
            .with_type(DataType::LongText, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Document, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Date, TypeInfo::sizeable("DATE"))
            .with_type(DataType::DateTime, TypeInfo::sizeable("TIMESTAMP"))
            .with_type(DataType::Timestamp, TypeInfo::sizeable("TIMESTAMP"))
            .with_type(DataType::Binary, TypeInfo::fixed("BYTEA"))
            .with_type(DataType::Uuid, TypeInfo::fixed("BYTEA"))
            .with_type(DataType::Boolean, TypeInfo::fixed("BOOLEAN"))
    }
}
