//! Field references and aggregation wrappers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A field reference split into its `database.collection.field` parts.
///
/// Missing parts mean "the collection/database of the owning query".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Database name, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Collection name, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Field name.
    pub field: String,
}

impl FieldRef {
    /// Parses a dotted reference, anchored on the right.
    ///
    /// ```rust
    /// use dbquery_core::FieldRef;
    ///
    /// let f = FieldRef::parse("shop.orders.total");
    /// assert_eq!(f.database.as_deref(), Some("shop"));
    /// assert_eq!(f.collection.as_deref(), Some("orders"));
    /// assert_eq!(f.field, "total");
    /// ```
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let mut parts = reference.rsplitn(3, '.');
        let field = parts.next().unwrap_or_default().to_string();
        let collection = parts.next().map(ToString::to_string);
        let database = parts.next().map(ToString::to_string);
        Self {
            database,
            collection,
            field,
        }
    }

    /// Creates an unqualified reference without parsing.
    #[must_use]
    pub fn plain(field: impl Into<String>) -> Self {
        Self {
            database: None,
            collection: None,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{database}.")?;
        }
        if let Some(collection) = &self.collection {
            write!(f, "{collection}.")?;
        }
        write!(f, "{}", self.field)
    }
}

/// Aggregation function wrapped around a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// `COUNT`.
    Count,
    /// `SUM`.
    Sum,
    /// `AVG`.
    Avg,
    /// `MIN`.
    Min,
    /// `MAX`.
    Max,
}

impl Aggregation {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }

    /// Wraps a field in this aggregation.
    #[must_use]
    pub fn of(self, field: &str) -> Target {
        Target {
            field: FieldRef::parse(field),
            aggregation: Some(self),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field argument, optionally wrapped in an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The referenced field.
    pub field: FieldRef,
    /// Aggregation applied to the field.
    pub aggregation: Option<Aggregation>,
}

impl From<&str> for Target {
    fn from(reference: &str) -> Self {
        Self {
            field: FieldRef::parse(reference),
            aggregation: None,
        }
    }
}

impl From<String> for Target {
    fn from(reference: String) -> Self {
        Self::from(reference.as_str())
    }
}

impl From<&String> for Target {
    fn from(reference: &String) -> Self {
        Self::from(reference.as_str())
    }
}

/// `COUNT(field)`.
#[must_use]
pub fn count(field: &str) -> Target {
    Aggregation::Count.of(field)
}

/// `SUM(field)`.
#[must_use]
pub fn sum(field: &str) -> Target {
    Aggregation::Sum.of(field)
}

/// `AVG(field)`.
#[must_use]
pub fn avg(field: &str) -> Target {
    Aggregation::Avg.of(field)
}

/// `MIN(field)`.
#[must_use]
pub fn min(field: &str) -> Target {
    Aggregation::Min.of(field)
}

/// `MAX(field)`.
#[must_use]
pub fn max(field: &str) -> Target {
    Aggregation::Max.of(field)
}
