//! # dbquery-core
//!
//! A database-agnostic query layer: fluent builders record what a query
//! means as a list of entries, and a per-backend compiler turns that list
//! into SQL text with positional parameters or into a document-store
//! command.
//!
//! This crate provides:
//! - Search, count, insert, update, replace, delete and create builders
//! - Collection lifecycle (drop, clear, size) and statement groups run as
//!   one batch
//! - Dialect descriptors for MySQL, MariaDB, PostgreSQL, SQL Server, H2 and
//!   SQLite, looked up through a [`DialectRegistry`]
//! - Deferred values: [`PREPARED`] marks a slot filled at execution time
//! - An [`Executor`] seam for whatever actually talks to the database
//!
//! ## Building and compiling
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dbquery_core::{
//!     BoxError, Command, Dialect, Driver, ExecutionMode, Executor, QueryResult, SearchQuery,
//!     SqlValue, PREPARED,
//! };
//!
//! struct Offline;
//!
//! impl Executor for Offline {
//!     fn execute(&self, _: &Command, _: &ExecutionMode) -> Result<QueryResult, BoxError> {
//!         Ok(QueryResult::default())
//!     }
//! }
//!
//! let driver = Driver::sql("main", Arc::new(Dialect::mysql()), Arc::new(Offline));
//! let users = driver.database("shop").collection("users");
//!
//! let query = users
//!     .find()
//!     .where_eq("age", PREPARED)
//!     .and(|q| q.where_higher("score", 50).where_lower("score", 100))
//!     .unwrap()
//!     .limit(10, 0)
//!     .unwrap();
//!
//! let command = query.compile(&[SqlValue::Int(18)]).unwrap();
//! let compiled = command.as_sql().unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT * FROM `shop`.`users`  WHERE `age`=? AND (`score`>? AND `score`<?) LIMIT ? OFFSET ?"
//! );
//! assert_eq!(compiled.params.len(), 5);
//! ```

pub mod builder;
pub mod collection;
pub mod compiler;
pub mod dialect;
pub mod document;
pub mod entry;
pub mod error;
pub mod executor;
pub mod field;
pub mod result;
pub mod statement;
pub mod value;

pub use builder::{
    ChangeQuery, CountQuery, CreateQuery, DeleteQuery, FindQuery, InsertQuery, IntoGroup,
    QueryGroup, ReplaceQuery, SearchQuery, UpdateQuery,
};
pub use collection::{Collection, Database, Driver, QueryLanguage};
pub use compiler::{CompiledQuery, SqlCompiler};
pub use dialect::{Dialect, DialectRegistry, Environment};
pub use document::DocumentCommand;
pub use entry::{DataType, FieldOption, ForeignKey, ForeignKeyAction, JoinType, SearchOrder};
pub use error::{BoxError, QueryError, Result};
pub use executor::{Command, ExecutionMode, Executor};
pub use field::{avg, count, max, min, sum, Aggregation, FieldRef, Target};
pub use result::{QueryResult, ResultEntry};
pub use statement::Statement;
pub use value::{IntoQueryValue, Pattern, Prepared, QueryValue, SqlValue, ToSqlValue, PREPARED};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::{BoxError, Collection, Command, Dialect, Driver, ExecutionMode, Executor, QueryResult};

    struct NoopExecutor;

    impl Executor for NoopExecutor {
        fn execute(&self, _: &Command, _: &ExecutionMode) -> Result<QueryResult, BoxError> {
            Ok(QueryResult::default())
        }
    }

    /// A collection on a local backtick-quoted dialect.
    pub(crate) fn collection(name: &str) -> Collection {
        collection_on(Dialect::h2_portable(), name)
    }

    pub(crate) fn collection_on(dialect: Dialect, name: &str) -> Collection {
        Driver::sql("test", Arc::new(dialect), Arc::new(NoopExecutor))
            .database("test")
            .collection(name)
    }
}
