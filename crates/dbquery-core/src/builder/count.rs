use crate::collection::Collection;
use crate::compiler::COUNT_COLUMN;
use crate::error::Result;
use crate::executor::ExecutionMode;
use crate::result::QueryResult;
use crate::statement::CountStatement;
use crate::value::SqlValue;

/// A count of the rows matching the search.
#[derive(Debug, Clone)]
pub struct CountQuery {
    collection: Collection,
    statement: CountStatement,
}

impl CountQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = CountStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }

    /// Executes the count and reads the number of matching rows.
    ///
    /// # Errors
    ///
    /// Fails on compile errors and on executor errors.
    pub fn size(&self, values: &[SqlValue]) -> Result<u64> {
        self.execute(values).map(|result| size_of(&result))
    }
}

/// Reads the count column; backends that return no row for an empty
/// match count zero.
pub(crate) fn size_of(result: &QueryResult) -> u64 {
    result
        .first()
        .and_then(|row| row.get_i64(COUNT_COLUMN))
        .and_then(|size| u64::try_from(size).ok())
        .unwrap_or(0)
}

executable_query!(CountQuery, CountStatement, ExecutionMode::Query);
search_query!(CountQuery);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SearchQuery;
    use crate::result::ResultEntry;
    use crate::testing::collection;
    use crate::value::PREPARED;

    #[test]
    fn test_count_with_filter() {
        let command = collection("users")
            .count()
            .where_higher("age", PREPARED)
            .compile(&[SqlValue::Int(18)])
            .unwrap();
        let compiled = command.as_sql().unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT COUNT(*) AS `size` FROM `users`  WHERE `age`>?"
        );
        assert_eq!(compiled.params, vec![SqlValue::Int(18)]);
    }

    #[test]
    fn test_size_of_missing_row_is_zero() {
        assert_eq!(size_of(&QueryResult::default()), 0);
        let row = ResultEntry::new().with(COUNT_COLUMN, SqlValue::Int(3));
        assert_eq!(size_of(&QueryResult::rows(vec![row])), 3);
    }
}
