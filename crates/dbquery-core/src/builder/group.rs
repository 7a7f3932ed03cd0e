use std::sync::Arc;

use crate::collection::Driver;
use crate::error::Result;
use crate::executor::{Command, ExecutionMode};
use crate::result::QueryResult;
use crate::statement::Statement;
use crate::value::SqlValue;

/// One statement of a group with its runtime values.
#[derive(Debug, Clone)]
struct GroupStep {
    statement: Statement,
    values: Vec<SqlValue>,
    mode: ExecutionMode,
}

/// Statements executed together as one batch.
///
/// Every statement is compiled before anything runs, so a statement that
/// fails to compile leaves the backend untouched. Executors that support
/// transactions apply the whole batch atomically.
#[derive(Debug, Clone)]
pub struct QueryGroup {
    driver: Arc<Driver>,
    steps: Vec<GroupStep>,
}

impl QueryGroup {
    pub(crate) const fn new(driver: Arc<Driver>) -> Self {
        Self {
            driver,
            steps: Vec::new(),
        }
    }

    /// Appends a statement or a builder together with its runtime values.
    #[must_use]
    pub fn add(mut self, statement: impl Into<Statement>, values: Vec<SqlValue>) -> Self {
        self.push(statement, values);
        self
    }

    /// Appends a statement in place.
    pub fn push(&mut self, statement: impl Into<Statement>, values: Vec<SqlValue>) {
        let statement = statement.into();
        let mode = ExecutionMode::for_statement(&statement);
        self.steps.push(GroupStep {
            statement,
            values,
            mode,
        });
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the group holds no statement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Removes every statement.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Compiles every statement in order.
    ///
    /// # Errors
    ///
    /// Fails on the first statement that cannot be compiled.
    pub fn compile(&self) -> Result<Vec<Command>> {
        self.steps
            .iter()
            .map(|step| self.driver.compile(&step.statement, &step.values))
            .collect()
    }

    /// Compiles and executes the group, one result per statement.
    ///
    /// # Errors
    ///
    /// Fails on compile errors and on executor errors.
    pub fn execute(&self) -> Result<Vec<QueryResult>> {
        let commands = self
            .compile()?
            .into_iter()
            .zip(self.steps.iter().map(|step| step.mode.clone()))
            .collect::<Vec<_>>();
        self.driver.run_group(&commands)
    }

    /// Executes the group on the blocking worker pool.
    ///
    /// # Errors
    ///
    /// As [`Self::execute`], plus worker failures.
    pub async fn execute_async(self) -> Result<Vec<QueryResult>> {
        tokio::task::spawn_blocking(move || self.execute()).await?
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{ChangeQuery, SearchQuery};
    use crate::statement::{ClearStatement, Statement};
    use crate::testing::collection;
    use crate::value::{SqlValue, PREPARED};

    #[test]
    fn test_group_compiles_in_order() {
        let users = collection("users");
        let mut group = users
            .group()
            .add(users.insert().set("name", PREPARED), vec![SqlValue::Text(String::from("neo"))])
            .add(users.update().set("active", true).where_eq("name", "neo"), vec![]);
        group.push(
            Statement::Clear(ClearStatement {
                collection: users.reference().clone(),
            }),
            vec![],
        );
        assert_eq!(group.len(), 3);

        let sql: Vec<_> = group
            .compile()
            .unwrap()
            .iter()
            .map(|command| command.as_sql().unwrap().sql.clone())
            .collect();
        assert_eq!(
            sql,
            vec![
                "INSERT INTO `users` (`name`) VALUES (?);",
                "UPDATE `users` SET `active`=? WHERE `name`=?",
                "DELETE FROM `users`",
            ]
        );

        group.clear();
        assert!(group.is_empty());
        assert!(group.execute().unwrap().is_empty());
    }

    #[test]
    fn test_group_with_missing_value_fails_before_running() {
        let users = collection("users");
        let group = users
            .group()
            .add(users.delete().where_eq("id", PREPARED), vec![]);
        assert!(group.execute().is_err());
    }
}
