//! Generic result rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::SqlValue;

/// One result row with named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultEntry {
    columns: BTreeMap<String, SqlValue>,
}

impl ResultEntry {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.insert(column.into(), value);
    }

    /// Returns the raw value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    /// Returns whether the row has `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Returns `column` as an integer.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            SqlValue::Int(i) => Some(*i),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns `column` as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            SqlValue::Float(f) => Some(*f),
            SqlValue::Int(i) => Some(*i as f64),
            SqlValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns `column` as text.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `column` as a boolean; integers are true when non-zero.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.get(column)? {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Returns the column names.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Result of one executed command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Returned rows, or generated keys for inserts.
    pub rows: Vec<ResultEntry>,
    /// Rows affected by a mutation.
    pub affected: u64,
}

impl QueryResult {
    /// Creates a result holding rows.
    #[must_use]
    pub const fn rows(rows: Vec<ResultEntry>) -> Self {
        Self { rows, affected: 0 }
    }

    /// Creates a result holding an affected row count.
    #[must_use]
    pub const fn affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected,
        }
    }

    /// Returns the first row.
    #[must_use]
    pub fn first(&self) -> Option<&ResultEntry> {
        self.rows.first()
    }

    /// Returns whether no row was returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = ResultEntry;
    type IntoIter = std::vec::IntoIter<ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
