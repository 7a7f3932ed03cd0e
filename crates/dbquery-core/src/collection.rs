//! Driver, database and collection handles.
//!
//! A [`Driver`] pairs a query language with an [`Executor`]. Handles are
//! cheap to clone and create the query builders.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::builder::{
    size_of, CountQuery, CreateQuery, DeleteQuery, FindQuery, InsertQuery, QueryGroup,
    ReplaceQuery, UpdateQuery,
};
use crate::compiler::SqlCompiler;
use crate::dialect::Dialect;
use crate::document;
use crate::entry::CollectionRef;
use crate::error::{QueryError, Result};
use crate::executor::{Command, ExecutionMode, Executor};
use crate::result::QueryResult;
use crate::statement::{ClearStatement, DropStatement, DropTarget, Statement};
use crate::value::SqlValue;

/// How statements are compiled for a driver.
#[derive(Debug, Clone)]
pub enum QueryLanguage {
    /// SQL in the given dialect.
    Sql(Arc<Dialect>),
    /// Document-store commands.
    Document,
}

impl QueryLanguage {
    /// Compiles `statement`, resolving PREPARED markers from `values`.
    ///
    /// # Errors
    ///
    /// Fails when the statement cannot be expressed with `values`.
    pub fn compile(&self, statement: &Statement, values: &[SqlValue]) -> Result<Command> {
        match self {
            Self::Sql(dialect) => SqlCompiler::new(dialect)
                .compile(statement, values)
                .map(Command::Sql),
            Self::Document => document::compile(statement, values).map(Command::Document),
        }
    }
}

/// Compiles statements and hands them to an executor.
pub struct Driver {
    name: String,
    language: QueryLanguage,
    executor: Arc<dyn Executor>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Creates a driver.
    pub fn new(
        name: impl Into<String>,
        language: QueryLanguage,
        executor: Arc<dyn Executor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            language,
            executor,
        })
    }

    /// Creates a SQL driver for `dialect`.
    pub fn sql(name: impl Into<String>, dialect: Arc<Dialect>, executor: Arc<dyn Executor>) -> Arc<Self> {
        Self::new(name, QueryLanguage::Sql(dialect), executor)
    }

    /// Creates a document-store driver.
    pub fn document(name: impl Into<String>, executor: Arc<dyn Executor>) -> Arc<Self> {
        Self::new(name, QueryLanguage::Document, executor)
    }

    /// Returns the driver name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the query language.
    #[must_use]
    pub const fn language(&self) -> &QueryLanguage {
        &self.language
    }

    /// Returns the SQL dialect, if this is a SQL driver.
    #[must_use]
    pub fn dialect(&self) -> Option<&Dialect> {
        match &self.language {
            QueryLanguage::Sql(dialect) => Some(dialect),
            QueryLanguage::Document => None,
        }
    }

    /// Opens a database handle.
    #[must_use]
    pub fn database(self: &Arc<Self>, name: impl Into<String>) -> Database {
        Database {
            name: name.into(),
            driver: Arc::clone(self),
        }
    }

    /// Compiles `statement` without running it.
    ///
    /// # Errors
    ///
    /// Fails when the statement cannot be expressed with `values`.
    pub fn compile(&self, statement: &Statement, values: &[SqlValue]) -> Result<Command> {
        self.language.compile(statement, values)
    }

    /// Compiles and executes `statement`.
    ///
    /// # Errors
    ///
    /// Fails on compile errors; executor failures carry the command text.
    pub fn run(
        &self,
        statement: &Statement,
        values: &[SqlValue],
        mode: &ExecutionMode,
    ) -> Result<QueryResult> {
        let command = self.compile(statement, values)?;
        debug!(driver = %self.name, command = %command, "Executing command");
        self.executor
            .execute(&command, mode)
            .map_err(|source| QueryError::Execution {
                command: command.text(),
                source,
            })
    }

    /// Runs [`Driver::run`] on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Driver::run`], plus worker failures.
    pub async fn run_async(
        self: Arc<Self>,
        statement: Statement,
        values: Vec<SqlValue>,
        mode: ExecutionMode,
    ) -> Result<QueryResult> {
        tokio::task::spawn_blocking(move || self.run(&statement, &values, &mode)).await?
    }

    /// Executes already compiled commands as one batch.
    ///
    /// # Errors
    ///
    /// Executor failures carry the text of every command in the batch.
    pub fn run_group(&self, commands: &[(Command, ExecutionMode)]) -> Result<Vec<QueryResult>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        debug!(driver = %self.name, commands = commands.len(), "Executing command group");
        self.executor
            .execute_group(commands)
            .map_err(|source| QueryError::Execution {
                command: commands
                    .iter()
                    .map(|(command, _)| command.text())
                    .collect::<Vec<_>>()
                    .join("; "),
                source,
            })
    }

    /// Runs `statement` without runtime values, in the mode its kind implies.
    fn run_statement(&self, statement: &Statement) -> Result<QueryResult> {
        self.run(statement, &[], &ExecutionMode::for_statement(statement))
    }

    async fn run_statement_async(self: Arc<Self>, statement: Statement) -> Result<QueryResult> {
        let mode = ExecutionMode::for_statement(&statement);
        self.run_async(statement, Vec::new(), mode).await
    }
}

/// A database on a driver.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    driver: Arc<Driver>,
}

impl Database {
    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the driver.
    #[must_use]
    pub const fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    /// Returns a handle on an existing collection.
    #[must_use]
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            reference: CollectionRef::new(self.name.clone(), name),
            driver: Arc::clone(&self.driver),
        }
    }

    /// Starts a create query for a new collection.
    #[must_use]
    pub fn create_collection(&self, name: impl Into<String>) -> CreateQuery {
        self.collection(name).create()
    }

    /// Drops the collection `name`.
    ///
    /// # Errors
    ///
    /// Fails on executor errors.
    pub fn drop_collection(&self, name: impl Into<String>) -> Result<QueryResult> {
        self.collection(name).drop()
    }

    /// Drops the collection `name` on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::drop_collection`], plus worker failures.
    pub async fn drop_collection_async(&self, name: &str) -> Result<QueryResult> {
        self.collection(name).drop_async().await
    }

    /// Drops the whole database.
    ///
    /// # Errors
    ///
    /// Fails on embedded SQL backends, which cannot drop a database, and on
    /// executor errors.
    pub fn drop(&self) -> Result<QueryResult> {
        self.driver.run_statement(&self.drop_statement())
    }

    /// Drops the whole database on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::drop`], plus worker failures.
    pub async fn drop_async(&self) -> Result<QueryResult> {
        Arc::clone(&self.driver)
            .run_statement_async(self.drop_statement())
            .await
    }

    /// Starts an empty statement group on this database's driver.
    #[must_use]
    pub fn group(&self) -> QueryGroup {
        QueryGroup::new(Arc::clone(&self.driver))
    }

    fn drop_statement(&self) -> Statement {
        Statement::Drop(DropStatement {
            target: DropTarget::Database(self.name.clone()),
        })
    }
}

/// A collection on a database.
#[derive(Debug, Clone)]
pub struct Collection {
    reference: CollectionRef,
    driver: Arc<Driver>,
}

impl Collection {
    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    /// Returns the database-qualified reference.
    #[must_use]
    pub const fn reference(&self) -> &CollectionRef {
        &self.reference
    }

    /// Returns the driver.
    #[must_use]
    pub const fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    /// Starts a find query.
    #[must_use]
    pub fn find(&self) -> FindQuery {
        FindQuery::new(self.clone())
    }

    /// Starts an insert query.
    #[must_use]
    pub fn insert(&self) -> InsertQuery {
        InsertQuery::new(self.clone())
    }

    /// Starts an update query.
    #[must_use]
    pub fn update(&self) -> UpdateQuery {
        UpdateQuery::new(self.clone())
    }

    /// Starts a delete query.
    #[must_use]
    pub fn delete(&self) -> DeleteQuery {
        DeleteQuery::new(self.clone())
    }

    /// Starts a replace query.
    #[must_use]
    pub fn replace(&self) -> ReplaceQuery {
        ReplaceQuery::new(self.clone())
    }

    /// Starts a create query for this collection.
    #[must_use]
    pub fn create(&self) -> CreateQuery {
        CreateQuery::new(self.clone())
    }

    /// Starts a count query.
    #[must_use]
    pub fn count(&self) -> CountQuery {
        CountQuery::new(self.clone())
    }

    /// Returns the number of rows in the collection.
    ///
    /// # Errors
    ///
    /// Fails on executor errors.
    pub fn size(&self) -> Result<u64> {
        self.count().size(&[])
    }

    /// Returns the number of rows on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::size`], plus worker failures.
    pub async fn size_async(&self) -> Result<u64> {
        let result = self.count().execute_async(Vec::new()).await?;
        Ok(size_of(&result))
    }

    /// Drops the collection and its rows.
    ///
    /// # Errors
    ///
    /// Fails on executor errors.
    pub fn drop(&self) -> Result<QueryResult> {
        self.driver.run_statement(&self.drop_statement())
    }

    /// Drops the collection on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::drop`], plus worker failures.
    pub async fn drop_async(&self) -> Result<QueryResult> {
        Arc::clone(&self.driver)
            .run_statement_async(self.drop_statement())
            .await
    }

    /// Removes every row and keeps the collection.
    ///
    /// # Errors
    ///
    /// Fails on executor errors.
    pub fn clear(&self) -> Result<QueryResult> {
        self.driver.run_statement(&self.clear_statement())
    }

    /// Removes every row on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::clear`], plus worker failures.
    pub async fn clear_async(&self) -> Result<QueryResult> {
        Arc::clone(&self.driver)
            .run_statement_async(self.clear_statement())
            .await
    }

    /// Starts an empty statement group on this collection's driver.
    #[must_use]
    pub fn group(&self) -> QueryGroup {
        QueryGroup::new(Arc::clone(&self.driver))
    }

    /// Returns the statement [`Self::drop`] runs.
    #[must_use]
    pub fn drop_statement(&self) -> Statement {
        Statement::Drop(DropStatement {
            target: DropTarget::Collection(self.reference.clone()),
        })
    }

    /// Returns the statement [`Self::clear`] runs.
    #[must_use]
    pub fn clear_statement(&self) -> Statement {
        Statement::Clear(ClearStatement {
            collection: self.reference.clone(),
        })
    }
}
