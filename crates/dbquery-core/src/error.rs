//! Error types for building, compiling and executing queries.

/// Boxed error returned by execution adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building, compiling or executing a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// `limit`, `only_one`, `index` or `page` was called twice on one query.
    #[error("Query already has a limit")]
    DuplicateLimit,

    /// A limit of zero rows was requested.
    #[error("Invalid limit {limit} (offset {offset}): limit must be greater than zero")]
    InvalidLimit {
        /// Requested row count.
        limit: u64,
        /// Requested offset.
        offset: u64,
    },

    /// Pages are numbered from one.
    #[error("Invalid page {0}: pages start at 1")]
    InvalidPage(u64),

    /// `on` was called without a directly preceding `join`.
    #[error("'on' must directly follow a 'join' call")]
    OnWithoutJoin,

    /// `values` did not supply exactly one value per declared field.
    #[error("Expected {expected} values (one per field), got {actual}")]
    ValuesMismatch {
        /// Number of declared fields.
        expected: usize,
        /// Number of supplied values.
        actual: usize,
    },

    /// Insert values cannot be grouped into whole rows.
    #[error("Cannot split {values} values into rows of {fields} fields")]
    UnbalancedInsert {
        /// Total number of values (explicit and runtime).
        values: usize,
        /// Number of fields per row.
        fields: usize,
    },

    /// One insert field holds more explicit values than there are rows.
    #[error("Field '{field}' has {values} values but only {rows} rows are inserted")]
    InsertOverflow {
        /// The overflowing field.
        field: String,
        /// Explicit values stored for the field.
        values: usize,
        /// Rows being inserted.
        rows: usize,
    },

    /// An insert without fields or without values.
    #[error("Insert into '{0}' has no fields or no values")]
    EmptyInsert(String),

    /// An update or replace without assignments.
    #[error("No fields are assigned in '{0}'")]
    NoAssignments(String),

    /// Arithmetic assignments only exist for updates.
    #[error("Arithmetic assignment on '{0}' is not allowed here")]
    InsertArithmetic(String),

    /// `include` was called twice on a create query.
    #[error("Create query already includes a query")]
    DuplicateInclude,

    /// A definition without a field name.
    #[error("Definition is missing a field name")]
    MissingField,

    /// More PREPARED markers than runtime values.
    #[error("Missing prepared value at position {0}")]
    MissingPreparedValue(usize),

    /// `IN` resolved to an empty value list.
    #[error("Empty value list for IN condition on '{0}'")]
    EmptyInList(String),

    /// An entry kind that has no meaning in the statement being compiled.
    #[error("Entry '{entry}' is not valid in a {statement} statement")]
    UnexpectedEntry {
        /// Entry kind.
        entry: &'static str,
        /// Statement kind.
        statement: &'static str,
    },

    /// The target dialect cannot express the requested operation.
    #[error("Operation '{operation}' is not supported by {dialect}")]
    Unsupported {
        /// Dialect name.
        dialect: String,
        /// Operation description.
        operation: String,
    },

    /// The execution adapter failed while running a command.
    #[error("Error executing query: {command}")]
    Execution {
        /// Compiled command text.
        command: String,
        /// Adapter error.
        #[source]
        source: BoxError,
    },

    /// The worker running an asynchronous execution failed.
    #[error("Execution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn unsupported(dialect: &str, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect: dialect.to_string(),
            operation: operation.into(),
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
