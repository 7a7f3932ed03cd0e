//! Error types for the command-line tool.

use std::path::PathBuf;

use dbquery_core::QueryError;

/// Errors raised outside the query layer.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Database error from the SQLite connection.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error reading a script.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compile or execution error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The script is not valid JSON.
    #[error("Failed to parse script '{}': {source}", path.display())]
    Script {
        /// Path to the script.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// No dialect is registered under the name.
    #[error("Unknown dialect '{0}'")]
    UnknownDialect(String),

    /// A value list reached a single placeholder.
    #[error("Parameter {0} is a value list and cannot be bound to one placeholder")]
    ListParameter(usize),

    /// The SQLite executor only runs SQL.
    #[error("Document commands cannot run against SQLite")]
    DocumentCommand,
}

/// Result type for the command-line tool.
pub type Result<T> = std::result::Result<T, CliError>;
