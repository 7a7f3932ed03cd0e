//! Execution adapter seam.
//!
//! The core never talks to a database. A driver hands every compiled
//! [`Command`] to an [`Executor`], which binds the parameters, runs the
//! command and returns a [`QueryResult`].

use std::fmt;

use crate::compiler::CompiledQuery;
use crate::document::DocumentCommand;
use crate::error::BoxError;
use crate::result::QueryResult;
use crate::statement::Statement;

/// A compiled command ready for an executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// SQL text with positional parameters.
    Sql(CompiledQuery),
    /// Document-store command.
    Document(DocumentCommand),
}

impl Command {
    /// Returns the command text used in diagnostics.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Sql(query) => query.sql.clone(),
            Self::Document(command) => command.to_json().to_string(),
        }
    }

    /// Returns the SQL query, if any.
    #[must_use]
    pub const fn as_sql(&self) -> Option<&CompiledQuery> {
        match self {
            Self::Sql(query) => Some(query),
            Self::Document(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// What the executor returns for a command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Rows are returned.
    #[default]
    Query,
    /// Only the affected row count is returned.
    Update,
    /// The affected row count plus one row of generated keys per inserted row.
    UpdateReturningKeys(Vec<String>),
}

impl ExecutionMode {
    /// Returns the mode builders use for `statement`.
    #[must_use]
    pub const fn for_statement(statement: &Statement) -> Self {
        match statement {
            Statement::Find(_) | Statement::Count(_) => Self::Query,
            _ => Self::Update,
        }
    }
}

/// Runs compiled commands against a backend.
pub trait Executor: Send + Sync {
    /// Executes `command` and materializes its result.
    fn execute(&self, command: &Command, mode: &ExecutionMode) -> Result<QueryResult, BoxError>;

    /// Executes a batch of commands in order, one result per command.
    ///
    /// Runs each command on its own and stops at the first failure.
    /// Backends with transactions override this to apply the batch as a
    /// whole or not at all.
    fn execute_group(
        &self,
        commands: &[(Command, ExecutionMode)],
    ) -> Result<Vec<QueryResult>, BoxError> {
        commands
            .iter()
            .map(|(command, mode)| self.execute(command, mode))
            .collect()
    }
}
