//! Search operations shared by find, update, delete and replace queries.

use crate::builder::FindQuery;
use crate::collection::Collection;
use crate::entry::{
    CollectionRef, ConditionEntry, ConditionKind, Entry, GroupByEntry, JoinEntry,
    JoinOnEntry, JoinType, LimitEntry, OperationEntry, OperationKind, OrderByEntry, SearchOrder,
};
use crate::error::{QueryError, Result};
use crate::field::Target;
use crate::value::{IntoQueryValue, QueryValue, SqlValue, ToSqlValue};

/// What a group-building closure may return: the query itself, or the
/// result of a fallible builder call such as a nested group.
pub trait IntoGroup {
    /// Unwraps the built query.
    ///
    /// # Errors
    ///
    /// Returns the builder error, if any.
    fn into_group(self) -> Result<FindQuery>;
}

impl IntoGroup for FindQuery {
    fn into_group(self) -> Result<FindQuery> {
        Ok(self)
    }
}

impl IntoGroup for Result<FindQuery> {
    fn into_group(self) -> Result<FindQuery> {
        self
    }
}

/// Filtering, joining, ordering and limiting over a query's entry list.
///
/// Every method appends to the entries in call order. Field names are
/// parsed right-anchored: `db.collection.field`, `collection.field` or
/// `field`. Values may be literals or [`PREPARED`](crate::PREPARED), and
/// fields may be wrapped in an aggregation with [`count`](crate::count) and
/// friends.
pub trait SearchQuery: Sized {
    /// Returns the queried collection.
    fn collection(&self) -> &Collection;

    /// Returns the entries appended so far.
    fn entries(&self) -> &[Entry];

    /// Returns the entry list for appending.
    fn entries_mut(&mut self) -> &mut Vec<Entry>;

    /// Appends a raw entry.
    #[must_use]
    fn push(mut self, entry: Entry) -> Self {
        self.entries_mut().push(entry);
        self
    }

    /// Appends a condition.
    #[must_use]
    fn condition(self, kind: ConditionKind, target: Target, value: QueryValue) -> Self {
        self.push(Entry::Condition(condition_entry(kind, target, value)))
    }

    /// Appends a negated condition.
    #[must_use]
    fn condition_not(self, kind: ConditionKind, target: Target, value: QueryValue) -> Self {
        self.push(Entry::Operation(OperationEntry {
            kind: OperationKind::Not,
            entries: vec![Entry::Condition(condition_entry(kind, target, value))],
        }))
    }

    /// `field = value`.
    #[must_use]
    fn where_eq(self, field: impl Into<Target>, value: impl IntoQueryValue) -> Self {
        self.condition(ConditionKind::Equals, field.into(), value.into_query_value())
    }

    /// `NOT field = value`.
    #[must_use]
    fn where_not(self, field: impl Into<Target>, value: impl IntoQueryValue) -> Self {
        self.condition_not(ConditionKind::Equals, field.into(), value.into_query_value())
    }

    /// `field LIKE pattern`; see [`Pattern`](crate::Pattern).
    #[must_use]
    fn where_like(self, field: impl Into<Target>, pattern: impl IntoQueryValue) -> Self {
        self.condition(ConditionKind::Like, field.into(), pattern.into_query_value())
    }

    /// `field < value`.
    #[must_use]
    fn where_lower(self, field: impl Into<Target>, value: impl IntoQueryValue) -> Self {
        self.condition(ConditionKind::Lower, field.into(), value.into_query_value())
    }

    /// `field > value`.
    #[must_use]
    fn where_higher(self, field: impl Into<Target>, value: impl IntoQueryValue) -> Self {
        self.condition(ConditionKind::Higher, field.into(), value.into_query_value())
    }

    /// `field IS NULL`.
    #[must_use]
    fn where_null(self, field: impl Into<Target>) -> Self {
        self.condition(
            ConditionKind::Null,
            field.into(),
            QueryValue::Literal(SqlValue::Null),
        )
    }

    /// `field IS NOT NULL`.
    #[must_use]
    fn where_not_null(self, field: impl Into<Target>) -> Self {
        self.condition_not(
            ConditionKind::Null,
            field.into(),
            QueryValue::Literal(SqlValue::Null),
        )
    }

    /// `field = ''`.
    #[must_use]
    fn where_empty(self, field: impl Into<Target>) -> Self {
        self.where_eq(field, "")
    }

    /// `field IN (...)` over literal values.
    #[must_use]
    fn where_in<I, T>(self, field: impl Into<Target>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.condition(
            ConditionKind::In,
            field.into(),
            QueryValue::Literal(SqlValue::list(values)),
        )
    }

    /// `field IN (...)` over one runtime value, usually a
    /// [`SqlValue::List`].
    #[must_use]
    fn where_in_prepared(self, field: impl Into<Target>) -> Self {
        self.condition(ConditionKind::In, field.into(), QueryValue::Prepared)
    }

    /// `field BETWEEN low AND high`.
    #[must_use]
    fn where_between(
        self,
        field: impl Into<Target>,
        low: impl IntoQueryValue,
        high: impl IntoQueryValue,
    ) -> Self {
        let mut entry = condition_entry(ConditionKind::Between, field.into(), low.into_query_value());
        entry.upper_bound = Some(high.into_query_value());
        self.push(Entry::Condition(entry))
    }

    /// Appends an operation over the entries built by `build` on a fresh
    /// query over the same collection.
    ///
    /// # Errors
    ///
    /// Fails when both this query and the built one carry a limit.
    fn operation<F, G>(self, kind: OperationKind, build: F) -> Result<Self>
    where
        F: FnOnce(FindQuery) -> G,
        G: IntoGroup,
    {
        let group = build(FindQuery::new(self.collection().clone())).into_group()?;
        self.operation_query(kind, group)
    }

    /// Appends an operation over the entries of `query`.
    ///
    /// # Errors
    ///
    /// Fails when both this query and `query` carry a limit.
    fn operation_query(self, kind: OperationKind, query: FindQuery) -> Result<Self> {
        let entries = query.into_statement().entries;
        if entries.iter().any(Entry::contains_limit)
            && self.entries().iter().any(Entry::contains_limit)
        {
            return Err(QueryError::DuplicateLimit);
        }
        Ok(self.push(Entry::Operation(OperationEntry { kind, entries })))
    }

    /// Appends a bracketed AND group.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn and<F, G>(self, build: F) -> Result<Self>
    where
        F: FnOnce(FindQuery) -> G,
        G: IntoGroup,
    {
        self.operation(OperationKind::And, build)
    }

    /// Appends a bracketed OR group.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn or<F, G>(self, build: F) -> Result<Self>
    where
        F: FnOnce(FindQuery) -> G,
        G: IntoGroup,
    {
        self.operation(OperationKind::Or, build)
    }

    /// Negates the entries built by `build`.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn not<F, G>(self, build: F) -> Result<Self>
    where
        F: FnOnce(FindQuery) -> G,
        G: IntoGroup,
    {
        self.operation(OperationKind::Not, build)
    }

    /// Appends a bracketed AND group built elsewhere.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn and_query(self, query: FindQuery) -> Result<Self> {
        self.operation_query(OperationKind::And, query)
    }

    /// Appends a bracketed OR group built elsewhere.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn or_query(self, query: FindQuery) -> Result<Self> {
        self.operation_query(OperationKind::Or, query)
    }

    /// Negates a query built elsewhere.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::operation_query`].
    fn not_query(self, query: FindQuery) -> Result<Self> {
        self.operation_query(OperationKind::Not, query)
    }

    /// Limits the result to `limit` rows after skipping `offset`.
    ///
    /// # Errors
    ///
    /// Fails when a limit is already set or `limit` is zero.
    fn limit(self, limit: u64, offset: u64) -> Result<Self> {
        if limit == 0 {
            return Err(QueryError::InvalidLimit { limit, offset });
        }
        if self.entries().iter().any(Entry::contains_limit) {
            return Err(QueryError::DuplicateLimit);
        }
        Ok(self.push(Entry::Limit(LimitEntry { limit, offset })))
    }

    /// Limits the result to the first `limit` rows.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::limit`].
    fn limit_to(self, limit: u64) -> Result<Self> {
        self.limit(limit, 0)
    }

    /// Limits the result to one row.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::limit`].
    fn only_one(self) -> Result<Self> {
        self.limit(1, 0)
    }

    /// Selects rows `start..=end`, counted from one.
    ///
    /// # Errors
    ///
    /// See [`SearchQuery::limit`]; an empty range is an invalid limit.
    fn index(self, start: u64, end: u64) -> Result<Self> {
        let limit = end.saturating_add(1).saturating_sub(start);
        self.limit(limit, start.saturating_sub(1))
    }

    /// Selects page `page` of `per_page` rows, counted from one.
    ///
    /// # Errors
    ///
    /// Fails on page zero, then as [`SearchQuery::index`].
    fn page(self, page: u64, per_page: u64) -> Result<Self> {
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }
        let end = page.saturating_mul(per_page);
        let start = (page - 1).saturating_mul(per_page).saturating_add(1);
        self.index(start, end)
    }

    /// Adds a sort key.
    #[must_use]
    fn order_by(self, field: impl Into<Target>, order: SearchOrder) -> Self {
        let target = field.into();
        self.push(Entry::OrderBy(OrderByEntry {
            field: target.field,
            order,
            aggregation: target.aggregation,
        }))
    }

    /// Adds a grouping key.
    #[must_use]
    fn group_by(self, field: impl Into<Target>) -> Self {
        let target = field.into();
        self.push(Entry::GroupBy(GroupByEntry {
            field: target.field,
            aggregation: target.aggregation,
        }))
    }

    /// Joins `collection`; follow with [`SearchQuery::on`].
    #[must_use]
    fn join(self, collection: &Collection, join_type: JoinType) -> Self {
        self.push(Entry::Join(JoinEntry {
            collection: collection.reference().clone(),
            join_type,
            on: Vec::new(),
        }))
    }

    /// Adds `column1 = column2` to the last join, where `column1` belongs
    /// to this collection and `column2` to the joined one.
    ///
    /// # Errors
    ///
    /// Fails unless the previous call was a join or another `on`.
    fn on(self, column1: &str, column2: &str) -> Result<Self> {
        let collection1 = self.collection().reference().clone();
        self.join_on(collection1, column1, None, column2)
    }

    /// Like [`SearchQuery::on`] with `column2` taken from `collection2`.
    ///
    /// # Errors
    ///
    /// Fails unless the previous call was a join or another `on`.
    fn on_collection(self, column1: &str, collection2: &Collection, column2: &str) -> Result<Self> {
        let collection1 = self.collection().reference().clone();
        self.join_on(
            collection1,
            column1,
            Some(collection2.reference().clone()),
            column2,
        )
    }

    #[doc(hidden)]
    fn join_on(
        mut self,
        collection1: CollectionRef,
        column1: &str,
        collection2: Option<CollectionRef>,
        column2: &str,
    ) -> Result<Self> {
        let Some(Entry::Join(join)) = self.entries_mut().last_mut() else {
            return Err(QueryError::OnWithoutJoin);
        };
        let collection2 = collection2.or_else(|| Some(join.collection.clone()));
        join.on.push(JoinOnEntry {
            collection1,
            column1: column1.to_owned(),
            collection2,
            column2: column2.to_owned(),
        });
        Ok(self)
    }
}

fn condition_entry(kind: ConditionKind, target: Target, value: QueryValue) -> ConditionEntry {
    ConditionEntry {
        kind,
        field: target.field,
        value,
        aggregation: target.aggregation,
        upper_bound: None,
    }
}
