use crate::collection::Collection;
use crate::entry::GetEntry;
use crate::executor::ExecutionMode;
use crate::field::Target;
use crate::statement::FindStatement;

/// A select over a collection.
#[derive(Debug, Clone)]
pub struct FindQuery {
    collection: Collection,
    statement: FindStatement,
}

impl FindQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = FindStatement {
            collection: collection.reference().clone(),
            projection: Vec::new(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }

    fn project(mut self, target: Target, alias: Option<String>) -> Self {
        self.statement.projection.push(GetEntry {
            field: target.field,
            aggregation: target.aggregation,
            alias,
        });
        self
    }

    /// Projects a column; without projections every column is returned.
    #[must_use]
    pub fn get(self, field: impl Into<Target>) -> Self {
        self.project(field.into(), None)
    }

    /// Projects a column under another name.
    #[must_use]
    pub fn get_as(self, field: impl Into<Target>, alias: &str) -> Self {
        self.project(field.into(), Some(alias.to_owned()))
    }

    /// Projects several columns.
    #[must_use]
    pub fn get_all<I, T>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        fields
            .into_iter()
            .fold(self, |query, field| query.project(field.into(), None))
    }
}

executable_query!(FindQuery, FindStatement, ExecutionMode::Query);
search_query!(FindQuery);

#[cfg(test)]
mod tests {
    use crate::builder::SearchQuery;
    use crate::entry::{JoinType, SearchOrder};
    use crate::executor::Command;
    use crate::field::count;
    use crate::testing::collection;
    use crate::value::{SqlValue, PREPARED};
    use crate::QueryError;

    fn sql(command: Command) -> (String, Vec<SqlValue>) {
        let query = command.as_sql().cloned().unwrap();
        (query.sql, query.params)
    }

    #[test]
    fn test_find_with_nested_group() {
        let query = collection("users")
            .find()
            .where_eq("age", 18)
            .and(|q| q.where_higher("score", 50).where_lower("score", 100))
            .unwrap()
            .limit(10, 0)
            .unwrap();
        let (text, params) = sql(query.compile(&[]).unwrap());
        assert_eq!(
            text,
            "SELECT * FROM `users`  WHERE `age`=? AND (`score`>? AND `score`<?) LIMIT ? OFFSET ?"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Int(18),
                SqlValue::Int(50),
                SqlValue::Int(100),
                SqlValue::Int(10),
                SqlValue::Int(0)
            ]
        );
    }

    #[test]
    fn test_projection_and_aggregation() {
        let query = collection("users")
            .find()
            .get("city")
            .get_as(count("id"), "people")
            .group_by("city")
            .order_by(count("id"), SearchOrder::Desc);
        let (text, _) = sql(query.compile(&[]).unwrap());
        assert_eq!(
            text,
            "SELECT `city`,COUNT(`id`) AS `people` FROM `users`  GROUP BY `city` ORDER BY COUNT(`id`) DESC"
        );
    }

    #[test]
    fn test_prepared_values_in_declaration_order() {
        let query = collection("users")
            .find()
            .limit(3, 0)
            .unwrap()
            .where_eq("name", PREPARED)
            .where_in_prepared("role");
        let values = [
            SqlValue::Text(String::from("neo")),
            SqlValue::list(["admin", "root"]),
        ];
        let (text, params) = sql(query.compile(&values).unwrap());
        assert_eq!(
            text,
            "SELECT * FROM `users`  WHERE `name`=? AND `role` IN (?,?) LIMIT ? OFFSET ?"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Text(String::from("neo")),
                SqlValue::Text(String::from("admin")),
                SqlValue::Text(String::from("root")),
                SqlValue::Int(3),
                SqlValue::Int(0)
            ]
        );
    }

    #[test]
    fn test_not_group() {
        let query = collection("users")
            .find()
            .not(|q| q.and(|q| q.where_eq("a", 1).where_eq("b", 2)))
            .unwrap();
        let (text, _) = sql(query.compile(&[]).unwrap());
        assert_eq!(text, "SELECT * FROM `users`  WHERE NOT (`a`=? AND `b`=?)");
    }

    #[test]
    fn test_join_on() {
        let users = collection("users");
        let orders = collection("orders");
        let query = users
            .find()
            .join(&orders, JoinType::Left)
            .on("id", "user_id")
            .unwrap();
        let (text, _) = sql(query.compile(&[]).unwrap());
        assert_eq!(
            text,
            "SELECT * FROM `users` LEFT JOIN `orders` ON `users`.`id`=`orders`.`user_id`"
        );
    }

    #[test]
    fn test_on_requires_join() {
        let result = collection("users").find().where_eq("a", 1).on("id", "user_id");
        assert!(matches!(result, Err(QueryError::OnWithoutJoin)));
    }

    #[test]
    fn test_limit_misuse() {
        let result = collection("users").find().limit(5, 0).unwrap().limit(10, 0);
        assert!(matches!(result, Err(QueryError::DuplicateLimit)));

        let result = collection("users").find().limit(0, 0);
        assert!(matches!(result, Err(QueryError::InvalidLimit { .. })));

        let result = collection("users").find().page(0, 10);
        assert!(matches!(result, Err(QueryError::InvalidPage(0))));
    }

    #[test]
    fn test_page_and_index() {
        let query = collection("users").find().page(3, 10).unwrap();
        let (_, params) = sql(query.compile(&[]).unwrap());
        assert_eq!(params, vec![SqlValue::Int(10), SqlValue::Int(20)]);

        let query = collection("users").find().index(1, 5).unwrap();
        let (_, params) = sql(query.compile(&[]).unwrap());
        assert_eq!(params, vec![SqlValue::Int(5), SqlValue::Int(0)]);
    }
}
