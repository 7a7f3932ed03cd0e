#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dbquery_core::{
    BoxError, Collection, Command, Dialect, Driver, Environment, ExecutionMode, Executor,
    QueryResult, SqlValue,
};

/// Records every command and answers with a fixed result.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(Command, ExecutionMode)>>,
    response: QueryResult,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering(response: QueryResult) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::default(),
            response,
        })
    }

    pub fn calls(&self) -> Vec<(Command, ExecutionMode)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> (Command, ExecutionMode) {
        self.calls().pop().expect("no command executed")
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, command: &Command, mode: &ExecutionMode) -> Result<QueryResult, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.clone(), mode.clone()));
        Ok(self.response.clone())
    }
}

/// Fails every command.
pub struct FailingExecutor;

impl Executor for FailingExecutor {
    fn execute(&self, _: &Command, _: &ExecutionMode) -> Result<QueryResult, BoxError> {
        Err("connection refused".into())
    }
}

/// An embedded dialect quoting with backticks.
pub fn local_dialect() -> Dialect {
    Dialect::new("X", Environment::Local).with_quotes('`', '`')
}

pub fn collection_on(dialect: Dialect, name: &str) -> (Collection, Arc<RecordingExecutor>) {
    let executor = RecordingExecutor::new();
    let driver = Driver::sql("test", Arc::new(dialect), executor.clone());
    (driver.database("db").collection(name), executor)
}

pub fn table(name: &str) -> Collection {
    collection_on(local_dialect(), name).0
}

pub fn sql(command: &Command) -> (String, Vec<SqlValue>) {
    let query = command
        .as_sql()
        .unwrap_or_else(|| panic!("Expected SQL, got {command:?}"));
    (query.sql.clone(), query.params.clone())
}

pub fn ints(values: &[i64]) -> Vec<SqlValue> {
    values.iter().copied().map(SqlValue::Int).collect()
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_owned())
}
