//! # dbquery-cli
//!
//! Support code for the `dbquery` binary: statement scripts, dialect
//! resolution and an SQLite [`Executor`](dbquery_core::Executor) built on
//! sqlx.

pub mod error;
pub mod executor;
pub mod script;

use dbquery_core::{DialectRegistry, QueryLanguage};

pub use error::{CliError, Result};
pub use executor::SqliteExecutor;
pub use script::Step;

/// Name selecting the document-store translation instead of a SQL dialect.
pub const DOCUMENT_LANGUAGE: &str = "document";

/// Resolves a dialect name, or [`DOCUMENT_LANGUAGE`], to a query language.
pub fn language(registry: &DialectRegistry, name: &str) -> Result<QueryLanguage> {
    if name.eq_ignore_ascii_case(DOCUMENT_LANGUAGE) {
        return Ok(QueryLanguage::Document);
    }
    registry
        .get(name)
        .map(QueryLanguage::Sql)
        .ok_or_else(|| CliError::UnknownDialect(name.to_owned()))
}

