//! SQL dialect descriptors.
//!
//! A [`Dialect`] is plain data: quoting characters, the type table and a
//! few named rendering strategies. One compiler consumes every dialect, so a
//! new backend is described rather than implemented.

mod mssql;
mod mysql;
mod postgres;
mod registry;
mod sqlite;

use std::collections::HashMap;

pub use registry::DialectRegistry;

use crate::entry::{CollectionRef, DataType};
use crate::field::FieldRef;

/// Where the backend lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Embedded single-file engine; table names stay unqualified.
    Local,
    /// Networked server; table names are qualified with the database.
    Remote,
}

/// Native type name and sizing for one abstract [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Native type name.
    pub name: String,
    /// Whether a `(size)` suffix is rendered.
    pub sizeable: bool,
    /// Size used when the definition gives none; zero renders no suffix.
    pub default_size: u32,
}

impl TypeInfo {
    /// A type that accepts a size but has no default one.
    pub fn sizeable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sizeable: true,
            default_size: 0,
        }
    }

    /// A type rendered with `default_size` unless a size is given.
    pub fn sized(name: impl Into<String>, default_size: u32) -> Self {
        Self {
            name: name.into(),
            sizeable: true,
            default_size,
        }
    }

    /// A type that never takes a size.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sizeable: false,
            default_size: 0,
        }
    }

    /// Renders the type for an optional explicit size.
    #[must_use]
    pub fn render(&self, size: Option<u32>) -> String {
        let size = size.filter(|s| *s != 0).unwrap_or(self.default_size);
        if self.sizeable && size != 0 {
            format!("{}({size})", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// How auto-increment columns are declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoIncrement {
    /// A column option keyword, e.g. ` AUTO_INCREMENT`.
    Keyword(String),
    /// Replaces the column type with `SERIAL` (`BIGSERIAL` for longs).
    Serial,
}

/// How DDL default values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultLiteral {
    /// ` DEFAULT ?` with the value bound.
    Bound,
    /// Inline literal; quoted for textual columns.
    Inline,
}

/// How secondary indexes are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStyle {
    /// Inside the table definition: `,INDEX name(field)`.
    Inline,
    /// Separate `CREATE INDEX IF NOT EXISTS` statements run afterwards.
    Separate,
}

/// Pagination syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// ` LIMIT ? OFFSET ?`.
    LimitOffset,
    /// ` OFFSET ? ROWS FETCH NEXT ? ROWS ONLY`; needs an ORDER BY.
    OffsetFetch,
}

/// Support for replace queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStyle {
    /// Replace queries are rejected.
    Unsupported,
    /// `REPLACE INTO table (fields) VALUES (...)`.
    ReplaceInto,
}

/// A backend-specific rendering descriptor.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    protocol: String,
    default_port: Option<u16>,
    environment: Environment,
    quotes: (char, char),
    types: HashMap<DataType, TypeInfo>,
    auto_increment: AutoIncrement,
    default_literal: DefaultLiteral,
    index_style: IndexStyle,
    limit_style: LimitStyle,
    replace_style: ReplaceStyle,
    primary_key_unique: bool,
    full_join: bool,
    create_select: bool,
    engine: bool,
}

impl Dialect {
    /// Creates a dialect with standard SQL behavior and an empty type table.
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        let name = name.into();
        Self {
            protocol: name.to_lowercase(),
            name,
            default_port: None,
            environment,
            quotes: ('"', '"'),
            types: HashMap::new(),
            auto_increment: AutoIncrement::Keyword(String::from(" AUTO_INCREMENT")),
            default_literal: DefaultLiteral::Bound,
            index_style: IndexStyle::Inline,
            limit_style: LimitStyle::LimitOffset,
            replace_style: ReplaceStyle::Unsupported,
            primary_key_unique: false,
            full_join: true,
            create_select: false,
            engine: false,
        }
    }

    /// Sets the connection URL scheme.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Sets the default server port.
    #[must_use]
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    /// Sets the opening and closing identifier quotes.
    #[must_use]
    pub fn with_quotes(mut self, open: char, close: char) -> Self {
        self.quotes = (open, close);
        self
    }

    /// Maps an abstract type to a native one.
    #[must_use]
    pub fn with_type(mut self, data_type: DataType, info: TypeInfo) -> Self {
        self.types.insert(data_type, info);
        self
    }

    /// Sets the auto-increment strategy.
    #[must_use]
    pub fn with_auto_increment(mut self, auto_increment: AutoIncrement) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Sets the default value strategy.
    #[must_use]
    pub fn with_default_literal(mut self, default_literal: DefaultLiteral) -> Self {
        self.default_literal = default_literal;
        self
    }

    /// Sets the index strategy.
    #[must_use]
    pub fn with_index_style(mut self, index_style: IndexStyle) -> Self {
        self.index_style = index_style;
        self
    }

    /// Sets the pagination syntax.
    #[must_use]
    pub fn with_limit_style(mut self, limit_style: LimitStyle) -> Self {
        self.limit_style = limit_style;
        self
    }

    /// Sets replace query support.
    #[must_use]
    pub fn with_replace_style(mut self, replace_style: ReplaceStyle) -> Self {
        self.replace_style = replace_style;
        self
    }

    /// Primary key columns also receive ` UNIQUE`.
    #[must_use]
    pub fn with_primary_key_unique(mut self, enabled: bool) -> Self {
        self.primary_key_unique = enabled;
        self
    }

    /// Sets whether `FULL JOIN` is available.
    #[must_use]
    pub fn with_full_join(mut self, enabled: bool) -> Self {
        self.full_join = enabled;
        self
    }

    /// Sets whether `CREATE TABLE ... AS SELECT` with column definitions works.
    #[must_use]
    pub fn with_create_select(mut self, enabled: bool) -> Self {
        self.create_select = enabled;
        self
    }

    /// Sets whether `ENGINE=` table options are rendered.
    #[must_use]
    pub fn with_engine(mut self, enabled: bool) -> Self {
        self.engine = enabled;
        self
    }

    /// Returns the name of the dialect.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the connection URL scheme.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the default server port.
    #[must_use]
    pub const fn default_port(&self) -> Option<u16> {
        self.default_port
    }

    /// Returns the environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the opening and closing identifier quotes.
    #[must_use]
    pub const fn identifier_quotes(&self) -> (char, char) {
        self.quotes
    }

    /// Returns the parameter placeholder.
    #[must_use]
    pub const fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Looks up the native type for an abstract one.
    #[must_use]
    pub fn type_info(&self, data_type: DataType) -> Option<&TypeInfo> {
        self.types.get(&data_type)
    }

    /// Returns the auto-increment strategy.
    #[must_use]
    pub const fn auto_increment(&self) -> &AutoIncrement {
        &self.auto_increment
    }

    /// Returns the default value strategy.
    #[must_use]
    pub const fn default_literal(&self) -> DefaultLiteral {
        self.default_literal
    }

    /// Returns the index strategy.
    #[must_use]
    pub const fn index_style(&self) -> IndexStyle {
        self.index_style
    }

    /// Returns the pagination syntax.
    #[must_use]
    pub const fn limit_style(&self) -> LimitStyle {
        self.limit_style
    }

    /// Returns replace query support.
    #[must_use]
    pub const fn replace_style(&self) -> ReplaceStyle {
        self.replace_style
    }

    /// Returns whether primary keys also render ` UNIQUE`.
    #[must_use]
    pub const fn primary_key_unique(&self) -> bool {
        self.primary_key_unique
    }

    /// Returns whether `FULL JOIN` is available.
    #[must_use]
    pub const fn supports_full_join(&self) -> bool {
        self.full_join
    }

    /// Returns whether create queries can include a select.
    #[must_use]
    pub const fn supports_create_select(&self) -> bool {
        self.create_select
    }

    /// Returns whether `ENGINE=` is rendered.
    #[must_use]
    pub const fn supports_engine(&self) -> bool {
        self.engine
    }

    /// Quotes an identifier, doubling embedded closing quotes.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.quotes;
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(open);
        for c in name.chars() {
            if c == close {
                quoted.push(close);
            }
            quoted.push(c);
        }
        quoted.push(close);
        quoted
    }

    /// Renders a table name, qualified with its database on remote backends.
    #[must_use]
    pub fn table(&self, collection: &CollectionRef) -> String {
        match self.environment {
            Environment::Remote => format!(
                "{}.{}",
                self.quote_identifier(&collection.database),
                self.quote_identifier(&collection.name)
            ),
            Environment::Local => self.quote_identifier(&collection.name),
        }
    }

    /// Renders a field reference with every given part quoted.
    #[must_use]
    pub fn field(&self, field: &FieldRef) -> String {
        let mut rendered = String::new();
        for part in [&field.database, &field.collection].into_iter().flatten() {
            rendered.push_str(&self.quote_identifier(part));
            rendered.push('.');
        }
        rendered.push_str(&self.quote_identifier(&field.field));
        rendered
    }

    /// Builds a connection URL: `host:port` for remote backends, a file path
    /// for local ones.
    #[must_use]
    pub fn connection_url(&self, location: &str, port: Option<u16>) -> String {
        match self.environment {
            Environment::Remote => match port.or(self.default_port) {
                Some(port) => format!("{}://{location}:{port}", self.protocol),
                None => format!("{}://{location}", self.protocol),
            },
            Environment::Local => format!("{}:{location}", self.protocol),
        }
    }
}
