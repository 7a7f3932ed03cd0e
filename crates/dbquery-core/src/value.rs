//! Values bound into compiled queries.
//!
//! Every value that reaches a backend travels as a [`SqlValue`] bound to a
//! placeholder. Builders store a [`QueryValue`], which is either such a
//! literal or the [`PREPARED`] marker resolved from the runtime values at
//! compile time.

use serde::{Deserialize, Serialize};

/// A value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Several values, spliced into an `IN (...)` list.
    List(Vec<SqlValue>),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Builds a multi-value container for `IN` conditions.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Only used for DDL defaults on dialects that cannot bind them.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_text(s),
            Self::List(values) => {
                let inner: Vec<String> = values.iter().map(Self::to_sql_inline).collect();
                format!("({})", inner.join(","))
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Renders the value as a quoted string literal regardless of its type.
    #[must_use]
    pub fn to_sql_text(&self) -> String {
        match self {
            Self::Text(s) => quote_text(s),
            Self::Null => String::from("NULL"),
            other => quote_text(&other.to_sql_inline()),
        }
    }

    /// Returns true if this is a multi-value container.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

fn quote_text(s: &str) -> String {
    // Escape single quotes by doubling them
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// A value stored in a query entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryValue {
    /// A value known while building.
    Literal(SqlValue),
    /// Taken from the runtime values when the query is compiled.
    Prepared,
}

impl QueryValue {
    /// Returns true for the PREPARED marker.
    #[must_use]
    pub const fn is_prepared(&self) -> bool {
        matches!(self, Self::Prepared)
    }
}

/// Marker type for values supplied at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prepared;

/// Defers a value until the query is executed.
///
/// ```rust
/// use dbquery_core::{QueryValue, PREPARED, IntoQueryValue};
///
/// assert_eq!(PREPARED.into_query_value(), QueryValue::Prepared);
/// ```
pub const PREPARED: Prepared = Prepared;

/// Trait for arguments accepted where either a literal or [`PREPARED`] fits.
pub trait IntoQueryValue {
    /// Converts the argument to a stored query value.
    fn into_query_value(self) -> QueryValue;
}

impl<T: ToSqlValue> IntoQueryValue for T {
    fn into_query_value(self) -> QueryValue {
        QueryValue::Literal(self.to_sql_value())
    }
}

impl IntoQueryValue for Prepared {
    fn into_query_value(self) -> QueryValue {
        QueryValue::Prepared
    }
}

impl IntoQueryValue for QueryValue {
    fn into_query_value(self) -> QueryValue {
        self
    }
}

/// Builder for `LIKE` patterns.
///
/// Text added with [`Pattern::exactly`], [`Pattern::starts_with`] and friends
/// is escaped, so `%` and `_` inside it match literally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pattern: String,
}

impl Pattern {
    /// Creates an empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches values starting with `text`.
    #[must_use]
    pub fn starts_with(text: &str) -> Self {
        Self::new().exactly(text).any()
    }

    /// Matches values ending with `text`.
    #[must_use]
    pub fn ends_with(text: &str) -> Self {
        Self::new().any().exactly(text)
    }

    /// Matches values containing `text`.
    #[must_use]
    pub fn contains(text: &str) -> Self {
        Self::new().any().exactly(text).any()
    }

    /// Appends literal text.
    #[must_use]
    pub fn exactly(mut self, text: &str) -> Self {
        for c in text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                self.pattern.push('\\');
            }
            self.pattern.push(c);
        }
        self
    }

    /// Appends a wildcard matching any sequence.
    #[must_use]
    pub fn any(mut self) -> Self {
        self.pattern.push('%');
        self
    }

    /// Appends a wildcard matching exactly one character.
    #[must_use]
    pub fn one(mut self) -> Self {
        self.pattern.push('_');
        self
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn build(self) -> String {
        self.pattern
    }
}

impl ToSqlValue for Pattern {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.pattern)
    }
}
