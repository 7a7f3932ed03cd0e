//! SQLite dialect.

use super::{AutoIncrement, DefaultLiteral, Dialect, Environment, IndexStyle, ReplaceStyle, TypeInfo};
use crate::entry::DataType;

impl Dialect {
    /// SQLite.
    ///
    /// Uses storage-class affinity names; sizes are never rendered. Defaults
    /// must be constant and indexes are created by separate statements.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new("SQLite", Environment::Local)
            .with_protocol("sqlite")
            .with_auto_increment(AutoIncrement::Keyword(String::from(" AUTOINCREMENT")))
            .with_default_literal(DefaultLiteral::Inline)
            .with_index_style(IndexStyle::Separate)
            .with_replace_style(ReplaceStyle::ReplaceInto)
            .with_full_join(false)
            .with_type(DataType::Double, TypeInfo::fixed("REAL"))
            .with_type(DataType::Float, TypeInfo::fixed("REAL"))
            .with_type(DataType::Decimal, TypeInfo::fixed("NUMERIC"))
            .with_type(DataType::Integer, TypeInfo::fixed("INTEGER"))
            .with_type(DataType::Long, TypeInfo::fixed("INTEGER"))
            .with_type(DataType::Char, TypeInfo::fixed("TEXT"))
            .with_type(DataType::String, TypeInfo::fixed("TEXT"))
            .with_type(DataType::LongText, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Document, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Date, TypeInfo::fixed("TEXT"))
            .with_type(DataType::DateTime, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Timestamp, TypeInfo::fixed("TEXT"))
            .with_type(DataType::Binary, TypeInfo::fixed("BLOB"))
            .with_type(DataType::Uuid, TypeInfo::fixed("BLOB"))
            .with_type(DataType::Boolean, TypeInfo::fixed("INTEGER"))
    }
}
