//! Filter, join, grouping, ordering and limit clauses.

use crate::dialect::{Dialect, LimitStyle};
use crate::entry::{
    ConditionEntry, ConditionKind, Entry, GroupByEntry, JoinEntry, JoinType, LimitEntry,
    OperationKind, OrderByEntry,
};
use crate::error::{QueryError, Result};
use crate::value::SqlValue;

use super::{SqlCompiler, ValueCursor};

/// Clause buffers for one compile call.
///
/// Entries may arrive in any order; [`SearchClauses::finish`] always
/// assembles join, filter, group by, order by and limit in that order.
pub(super) struct SearchClauses<'d> {
    compiler: SqlCompiler<'d>,
    statement: &'static str,
    join: String,
    clause: String,
    clause_params: Vec<SqlValue>,
    group_by: String,
    order_by: String,
    limit: String,
    limit_params: Vec<SqlValue>,
    // `WHERE` has been written
    opened: bool,
    negate: bool,
    has_limit: bool,
}

impl<'d> SearchClauses<'d> {
    pub(super) fn new(dialect: &'d Dialect, statement: &'static str) -> Self {
        Self {
            compiler: SqlCompiler::new(dialect),
            statement,
            join: String::new(),
            clause: String::new(),
            clause_params: Vec::new(),
            group_by: String::new(),
            order_by: String::new(),
            limit: String::new(),
            limit_params: Vec::new(),
            opened: false,
            negate: false,
            has_limit: false,
        }
    }

    /// Adds one top-level entry.
    pub(super) fn push(&mut self, entry: &Entry, cursor: &mut ValueCursor<'_>) -> Result<()> {
        self.entry(entry, OperationKind::And, false, cursor).map(|_| ())
    }

    /// Concatenates the clauses and their bound values.
    pub(super) fn finish(mut self) -> (String, Vec<SqlValue>) {
        if self.has_limit
            && self.order_by.is_empty()
            && self.dialect().limit_style() == LimitStyle::OffsetFetch
        {
            self.order_by.push_str(" ORDER BY (SELECT NULL)");
        }
        let sql = [
            self.join,
            self.clause,
            self.group_by,
            self.order_by,
            self.limit,
        ]
        .concat();
        let mut params = self.clause_params;
        params.extend(self.limit_params);
        (sql, params)
    }

    const fn dialect(&self) -> &'d Dialect {
        self.compiler.dialect()
    }

    /// Renders `entries` as operands of `connector`. Returns true if any
    /// predicate was written.
    fn render(
        &mut self,
        entries: &[Entry],
        connector: OperationKind,
        bracket_first: bool,
        cursor: &mut ValueCursor<'_>,
    ) -> Result<bool> {
        let mut first = bracket_first;
        let mut written = false;
        for entry in entries {
            if self.entry(entry, connector, first, cursor)? {
                first = false;
                written = true;
            }
        }
        Ok(written)
    }

    fn entry(
        &mut self,
        entry: &Entry,
        connector: OperationKind,
        first: bool,
        cursor: &mut ValueCursor<'_>,
    ) -> Result<bool> {
        match entry {
            Entry::Condition(condition) => {
                self.connector(connector, first);
                self.condition(condition, cursor)?;
                Ok(true)
            }
            Entry::Operation(operation) => match operation.kind {
                OperationKind::Not => {
                    let negate = self.negate;
                    self.negate = !negate;
                    let written = self.render(&operation.entries, connector, first, cursor);
                    self.negate = negate;
                    written
                }
                kind => {
                    if !entry.is_predicate() {
                        // Nothing to bracket; still collect joins, limits and sort keys.
                        return self.render(&operation.entries, kind, true, cursor);
                    }
                    self.connector(connector, first);
                    if self.negate {
                        self.clause.push_str("NOT ");
                    }
                    self.clause.push('(');
                    let negate = std::mem::replace(&mut self.negate, false);
                    let written = self.render(&operation.entries, kind, true, cursor);
                    self.negate = negate;
                    self.clause.push(')');
                    written.map(|_| true)
                }
            },
            Entry::Join(join) => self.join(join).map(|()| false),
            Entry::Limit(limit) => self.limit(*limit).map(|()| false),
            Entry::OrderBy(order) => {
                self.order_by(order);
                Ok(false)
            }
            Entry::GroupBy(group) => {
                self.group_by(group);
                Ok(false)
            }
            Entry::Set(_) => Err(QueryError::UnexpectedEntry {
                entry: entry.kind(),
                statement: self.statement,
            }),
        }
    }

    fn connector(&mut self, connector: OperationKind, first: bool) {
        if first {
            return;
        }
        if self.opened {
            self.clause.push(' ');
            self.clause.push_str(connector.as_str());
            self.clause.push(' ');
        } else {
            self.clause.push_str(" WHERE ");
            self.opened = true;
        }
    }

    fn condition(&mut self, condition: &ConditionEntry, cursor: &mut ValueCursor<'_>) -> Result<()> {
        let field = self
            .compiler
            .target(&condition.field, condition.aggregation);
        let not = if self.negate { "NOT " } else { "" };
        match condition.kind {
            ConditionKind::Equals | ConditionKind::Like | ConditionKind::Lower | ConditionKind::Higher => {
                let symbol = match condition.kind {
                    ConditionKind::Like => " LIKE ",
                    ConditionKind::Lower => "<",
                    ConditionKind::Higher => ">",
                    _ => "=",
                };
                self.clause.push_str(&format!("{not}{field}{symbol}?"));
                let value = cursor.resolve(&condition.value)?;
                self.clause_params.push(value);
            }
            ConditionKind::Null => {
                self.clause.push_str(&format!("{field} IS {not}NULL"));
            }
            ConditionKind::In => {
                let values = match cursor.resolve(&condition.value)? {
                    SqlValue::List(values) => values,
                    value => vec![value],
                };
                if values.is_empty() {
                    return Err(QueryError::EmptyInList(condition.field.to_string()));
                }
                let placeholders = vec!["?"; values.len()].join(",");
                self.clause.push_str(&format!("{not}{field} IN ({placeholders})"));
                self.clause_params.extend(values);
            }
            ConditionKind::Between => {
                let upper = condition
                    .upper_bound
                    .as_ref()
                    .ok_or(QueryError::UnexpectedEntry {
                        entry: "between without upper bound",
                        statement: self.statement,
                    })?;
                self.clause.push_str(&format!("{not}{field} BETWEEN ? AND ?"));
                let lower = cursor.resolve(&condition.value)?;
                let upper = cursor.resolve(upper)?;
                self.clause_params.push(lower);
                self.clause_params.push(upper);
            }
        }
        Ok(())
    }

    fn join(&mut self, join: &JoinEntry) -> Result<()> {
        if join.join_type == JoinType::Full && !self.dialect().supports_full_join() {
            return Err(QueryError::unsupported(self.dialect().name(), "FULL JOIN"));
        }
        let dialect = self.dialect();
        if !self.join.is_empty() {
            self.join.push(' ');
        }
        self.join.push_str(&format!(
            "{} JOIN {}",
            join.join_type.as_str(),
            dialect.table(&join.collection)
        ));
        for (index, on) in join.on.iter().enumerate() {
            let left = format!(
                "{}.{}",
                dialect.table(&on.collection1),
                dialect.quote_identifier(&on.column1)
            );
            let right = match &on.collection2 {
                Some(collection) => format!(
                    "{}.{}",
                    dialect.table(collection),
                    dialect.quote_identifier(&on.column2)
                ),
                None => dialect.quote_identifier(&on.column2),
            };
            let keyword = if index == 0 { "ON" } else { "AND" };
            self.join.push_str(&format!(" {keyword} {left}={right}"));
        }
        Ok(())
    }

    fn limit(&mut self, limit: LimitEntry) -> Result<()> {
        if self.has_limit {
            return Err(QueryError::DuplicateLimit);
        }
        self.has_limit = true;
        let (limit_value, offset_value) = (
            SqlValue::Int(i64::try_from(limit.limit).unwrap_or(i64::MAX)),
            SqlValue::Int(i64::try_from(limit.offset).unwrap_or(i64::MAX)),
        );
        match self.dialect().limit_style() {
            LimitStyle::LimitOffset => {
                self.limit.push_str(" LIMIT ? OFFSET ?");
                self.limit_params.push(limit_value);
                self.limit_params.push(offset_value);
            }
            LimitStyle::OffsetFetch => {
                self.limit.push_str(" OFFSET ? ROWS FETCH NEXT ? ROWS ONLY");
                self.limit_params.push(offset_value);
                self.limit_params.push(limit_value);
            }
        }
        Ok(())
    }

    fn order_by(&mut self, order: &OrderByEntry) {
        self.order_by
            .push_str(if self.order_by.is_empty() { " ORDER BY " } else { "," });
        let field = self.compiler.target(&order.field, order.aggregation);
        self.order_by
            .push_str(&format!("{field} {}", order.order.as_str()));
    }

    fn group_by(&mut self, group: &GroupByEntry) {
        self.group_by
            .push_str(if self.group_by.is_empty() { " GROUP BY " } else { "," });
        let field = self.compiler.target(&group.field, group.aggregation);
        self.group_by.push_str(&field);
    }
}
