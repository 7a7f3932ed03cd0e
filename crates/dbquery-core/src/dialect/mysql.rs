//! MySQL-family dialects: MySQL, MariaDB and embedded H2 in MySQL mode.

use super::{Dialect, Environment, ReplaceStyle, TypeInfo};
use crate::entry::DataType;

impl Dialect {
    /// MySQL.
    #[must_use]
    pub fn mysql() -> Self {
        mysql_family("MySQL", Environment::Remote)
            .with_protocol("mysql")
            .with_default_port(3306)
    }

    /// MariaDB; rendered exactly like MySQL.
    #[must_use]
    pub fn mariadb() -> Self {
        mysql_family("MariaDB", Environment::Remote)
            .with_protocol("mariadb")
            .with_default_port(3306)
    }

    /// H2 embedded database running in MySQL compatibility mode.
    #[must_use]
    pub fn h2_portable() -> Self {
        mysql_family("H2Portable", Environment::Local).with_protocol("h2:file")
    }
}

fn mysql_family(name: &str, environment: Environment) -> Dialect {
    Dialect::new(name, environment)
        .with_quotes('`', '`')
        .with_replace_style(ReplaceStyle::ReplaceInto)
        .with_full_join(false)
        .with_create_select(true)
        .with_engine(true)
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
        .with_type(DataType::Boolean, TypeInfo::sized("BIT", 1))
}
