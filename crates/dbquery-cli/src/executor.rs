//! SQLite execution through sqlx.
//!
//! [`Executor`] is synchronous, so commands are driven to completion on the
//! runtime handle captured at connect time. Call it from a blocking worker,
//! which is what `execute_async` and `Driver::run_async` do.

use dbquery_core::{
    BoxError, Command, CompiledQuery, ExecutionMode, Executor, QueryResult, ResultEntry, SqlValue,
};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::{CliError, Result};

/// Runs SQL commands against an SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
    handle: Handle,
}

impl SqliteExecutor {
    /// Wraps an existing pool; commands run on `handle`.
    #[must_use]
    pub const fn new(pool: SqlitePool, handle: Handle) -> Self {
        Self { pool, handle }
    }

    /// Connects to `url` from inside a tokio runtime.
    ///
    /// In-memory databases get a single connection so every command sees
    /// the same data.
    pub async fn connect(url: &str) -> Result<Self> {
        let connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool, Handle::current()))
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a compiled query and its additional statements in one
    /// transaction.
    pub async fn run(&self, query: &CompiledQuery, mode: &ExecutionMode) -> Result<QueryResult> {
        let mut tx = self.pool.begin().await?;
        let result = apply(&mut *tx, query, mode).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Runs every query of a group in one transaction; a failing query
    /// rolls back the ones before it.
    pub async fn run_group(
        &self,
        queries: &[(&CompiledQuery, &ExecutionMode)],
    ) -> Result<Vec<QueryResult>> {
        debug!(queries = queries.len(), "Running group on SQLite");
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(queries.len());
        for (query, mode) in queries {
            results.push(apply(&mut *tx, query, mode).await?);
        }
        tx.commit().await?;
        Ok(results)
    }
}

impl Executor for SqliteExecutor {
    fn execute(&self, command: &Command, mode: &ExecutionMode) -> std::result::Result<QueryResult, BoxError> {
        let Command::Sql(query) = command else {
            return Err(CliError::DocumentCommand.into());
        };
        self.handle
            .block_on(self.run(query, mode))
            .map_err(Into::into)
    }

    fn execute_group(
        &self,
        commands: &[(Command, ExecutionMode)],
    ) -> std::result::Result<Vec<QueryResult>, BoxError> {
        let queries = commands
            .iter()
            .map(|(command, mode)| match command {
                Command::Sql(query) => Ok((query, mode)),
                Command::Document(_) => Err(CliError::DocumentCommand),
            })
            .collect::<Result<Vec<_>>>()?;
        self.handle
            .block_on(self.run_group(&queries))
            .map_err(Into::into)
    }
}

async fn apply(
    connection: &mut SqliteConnection,
    query: &CompiledQuery,
    mode: &ExecutionMode,
) -> Result<QueryResult> {
    debug!(sql = %query.sql, params = query.params.len(), "Running on SQLite");
    let statement = bind(sqlx::query(&query.sql), &query.params)?;
    let result = match mode {
        ExecutionMode::Query => {
            let rows = statement.fetch_all(&mut *connection).await?;
            let rows = rows.iter().map(row_entry).collect::<Result<Vec<_>>>()?;
            QueryResult::rows(rows)
        }
        ExecutionMode::Update => {
            let done = statement.execute(&mut *connection).await?;
            QueryResult::affected(done.rows_affected())
        }
        ExecutionMode::UpdateReturningKeys(columns) => {
            let done = statement.execute(&mut *connection).await?;
            let mut result = QueryResult::affected(done.rows_affected());
            result.rows = generated_keys(columns, done.last_insert_rowid(), done.rows_affected());
            result
        }
    };
    for additional in &query.additional_statements {
        debug!(sql = %additional, "Running additional statement");
        sqlx::query(additional).execute(&mut *connection).await?;
    }
    Ok(result)
}

/// Binds every parameter; lists are spliced at compile time and never
/// reach a single placeholder.
fn bind<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
    for (position, param) in params.iter().enumerate() {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
            SqlValue::List(_) => return Err(CliError::ListParameter(position)),
        };
    }
    Ok(query)
}

/// SQLite assigns consecutive rowids to the rows of one insert.
fn generated_keys(columns: &[String], last_rowid: i64, rows: u64) -> Vec<ResultEntry> {
    if rows == 0 {
        return Vec::new();
    }
    let first = last_rowid
        .saturating_sub(i64::try_from(rows).unwrap_or(i64::MAX))
        .saturating_add(1);
    (first..=last_rowid)
        .map(|rowid| {
            columns.iter().fold(ResultEntry::new(), |entry, column| {
                entry.with(column.clone(), SqlValue::Int(rowid))
            })
        })
        .collect()
}

fn row_entry(row: &SqliteRow) -> Result<ResultEntry> {
    let mut entry = ResultEntry::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let type_info = raw.type_info();
            match type_info.name() {
                "INTEGER" => SqlValue::Int(row.try_get(index)?),
                "BOOLEAN" => SqlValue::Bool(row.try_get(index)?),
                "REAL" | "NUMERIC" => SqlValue::Float(row.try_get(index)?),
                "BLOB" => SqlValue::Blob(row.try_get(index)?),
                _ => SqlValue::Text(row.try_get(index)?),
            }
        };
        entry.insert(column.name(), value);
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_parameter_is_rejected() {
        let params = [SqlValue::Int(1), SqlValue::list([2, 3])];
        let result = bind(sqlx::query("SELECT ?, ?"), &params);
        assert!(matches!(result, Err(CliError::ListParameter(1))));
    }

    #[test]
    fn test_generated_keys_cover_every_inserted_row() {
        let keys = generated_keys(&[String::from("id")], 12, 3);
        let ids: Vec<_> = keys.iter().filter_map(|row| row.get_i64("id")).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert!(generated_keys(&[String::from("id")], 12, 0).is_empty());
    }
}
