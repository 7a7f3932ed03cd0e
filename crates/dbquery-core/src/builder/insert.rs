use crate::collection::Collection;
use crate::entry::InsertEntry;
use crate::error::{QueryError, Result};
use crate::executor::ExecutionMode;
use crate::result::QueryResult;
use crate::statement::{InsertStatement, Statement};
use crate::value::{IntoQueryValue, SqlValue, PREPARED};

/// An insert of one or more rows.
///
/// Each field holds a list of values; `n` values per field make `n` rows.
/// Fields left without values take theirs from the runtime values.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    collection: Collection,
    statement: InsertStatement,
}

impl InsertQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = InsertStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }

    fn field_mut(&mut self, field: &str) -> &mut InsertEntry {
        let position = self
            .statement
            .entries
            .iter()
            .position(|entry| entry.field.eq_ignore_ascii_case(field));
        let index = position.unwrap_or_else(|| {
            self.statement.entries.push(InsertEntry {
                field: field.to_owned(),
                values: Vec::new(),
            });
            self.statement.entries.len() - 1
        });
        &mut self.statement.entries[index]
    }

    /// Appends a value to `field`; repeated calls add rows.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl IntoQueryValue) -> Self {
        self.field_mut(field).values.push(value.into_query_value());
        self
    }

    /// Appends a runtime value to `field`.
    #[must_use]
    pub fn set_prepared(self, field: &str) -> Self {
        self.set(field, PREPARED)
    }

    /// Declares fields in order without values.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.field_mut(field);
        }
        self
    }

    /// Appends one row, one value per declared field.
    ///
    /// # Errors
    ///
    /// Fails when the number of values differs from the number of fields.
    pub fn values<I, V>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: IntoQueryValue,
    {
        let values: Vec<_> = values.into_iter().map(IntoQueryValue::into_query_value).collect();
        let expected = self.statement.entries.len();
        if values.len() != expected {
            return Err(QueryError::ValuesMismatch {
                expected,
                actual: values.len(),
            });
        }
        for (entry, value) in self.statement.entries.iter_mut().zip(values) {
            entry.values.push(value);
        }
        Ok(self)
    }

    /// Executes the insert and returns one row of `key_columns` per
    /// inserted row.
    ///
    /// # Errors
    ///
    /// Fails on compile errors and on executor errors.
    pub fn execute_and_get_generated_keys(
        &self,
        key_columns: &[&str],
        values: &[SqlValue],
    ) -> Result<QueryResult> {
        let mode = ExecutionMode::UpdateReturningKeys(
            key_columns.iter().map(|column| (*column).to_owned()).collect(),
        );
        let statement = Statement::from(self.statement.clone());
        self.collection.driver().run(&statement, values, &mode)
    }
}

executable_query!(InsertQuery, InsertStatement, ExecutionMode::Update);

#[cfg(test)]
mod tests {
    use crate::executor::Command;
    use crate::testing::collection;
    use crate::value::{SqlValue, PREPARED};
    use crate::QueryError;

    fn sql(command: Command) -> (String, Vec<SqlValue>) {
        let query = command.as_sql().cloned().unwrap();
        (query.sql, query.params)
    }

    #[test]
    fn test_set_groups_rows_per_field() {
        let query = collection("users")
            .insert()
            .set("name", "a")
            .set("age", 1)
            .set("NAME", "b")
            .set("age", PREPARED);
        let (text, params) = sql(query.compile(&[SqlValue::Int(2)]).unwrap());
        assert_eq!(text, "INSERT INTO `users` (`name`,`age`) VALUES (?,?),(?,?);");
        assert_eq!(
            params,
            vec![
                SqlValue::Text(String::from("a")),
                SqlValue::Int(1),
                SqlValue::Text(String::from("b")),
                SqlValue::Int(2)
            ]
        );
    }

    #[test]
    fn test_fields_then_runtime_values() {
        let query = collection("users").insert().fields(&["name", "age"]);
        let values = [
            SqlValue::Text(String::from("a")),
            SqlValue::Int(1),
            SqlValue::Text(String::from("b")),
            SqlValue::Int(2),
            SqlValue::Text(String::from("c")),
            SqlValue::Int(3),
        ];
        let command = query.compile(&values).unwrap();
        let query = command.as_sql().unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `users` (`name`,`age`) VALUES (?,?),(?,?),(?,?);"
        );
        assert_eq!(query.params, values.to_vec());
    }

    #[test]
    fn test_values_must_match_fields() {
        let result = collection("users")
            .insert()
            .fields(&["name", "age"])
            .values([SqlValue::Int(1)]);
        assert!(matches!(
            result,
            Err(QueryError::ValuesMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_unbalanced_runtime_values() {
        let query = collection("users").insert().fields(&["name", "age"]);
        let result = query.compile(&[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]);
        assert!(matches!(result, Err(QueryError::UnbalancedInsert { .. })));
    }
}
