//! SQL compilation.
//!
//! [`SqlCompiler`] turns a [`Statement`] and the runtime values into SQL
//! text plus the values bound to its placeholders, in placeholder order.
//!
//! ```rust
//! use dbquery_core::compiler::SqlCompiler;
//! use dbquery_core::dialect::Dialect;
//! use dbquery_core::entry::{CollectionRef, ConditionEntry, ConditionKind, Entry};
//! use dbquery_core::statement::FindStatement;
//! use dbquery_core::{FieldRef, QueryValue, SqlValue};
//!
//! let statement = FindStatement {
//!     collection: CollectionRef::new("shop", "users"),
//!     projection: vec![],
//!     entries: vec![Entry::Condition(ConditionEntry {
//!         kind: ConditionKind::Equals,
//!         field: FieldRef::parse("name"),
//!         value: QueryValue::Prepared,
//!         aggregation: None,
//!         upper_bound: None,
//!     })],
//! };
//!
//! let dialect = Dialect::mysql();
//! let query = SqlCompiler::new(&dialect)
//!     .find(&statement, &[SqlValue::Text("alice".into())])
//!     .unwrap();
//! assert_eq!(query.sql, "SELECT * FROM `shop`.`users`  WHERE `name`=?");
//! assert_eq!(query.params, vec![SqlValue::Text("alice".into())]);
//! ```

mod ddl;
mod insert;
mod search;

use tracing::debug;

use crate::dialect::{Dialect, Environment};
use crate::entry::{Entry, GetEntry, SetEntry};
use crate::error::{QueryError, Result};
use crate::field::{Aggregation, FieldRef};
use crate::statement::{
    ClearStatement, CountStatement, DeleteStatement, DropStatement, DropTarget, FindStatement,
    Statement, UpdateStatement,
};
use crate::value::{QueryValue, SqlValue};

pub(crate) use insert::insert_rows;

/// Column holding the result of a count statement.
pub const COUNT_COLUMN: &str = "size";
use search::SearchClauses;

/// SQL text with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Command text with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, left to right.
    pub params: Vec<SqlValue>,
    /// Statements to run after `sql`, without parameters.
    pub additional_statements: Vec<String>,
}

impl CompiledQuery {
    fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self {
            sql,
            params,
            additional_statements: Vec::new(),
        }
    }

    /// Counts the placeholders in the command text, skipping quoted
    /// identifiers and string literals.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut closing = None;
        for c in self.sql.chars() {
            match closing {
                Some(close) if c == close => closing = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' | '`' => closing = Some(c),
                    '[' => closing = Some(']'),
                    '?' => count += 1,
                    _ => {}
                },
            }
        }
        count
    }
}

/// Positional cursor over the runtime values.
#[derive(Debug)]
pub(crate) struct ValueCursor<'v> {
    values: &'v [SqlValue],
    position: usize,
}

impl<'v> ValueCursor<'v> {
    pub(crate) const fn new(values: &'v [SqlValue]) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Takes the next runtime value.
    pub(crate) fn next_value(&mut self) -> Result<SqlValue> {
        let value = self
            .values
            .get(self.position)
            .cloned()
            .ok_or(QueryError::MissingPreparedValue(self.position))?;
        self.position += 1;
        Ok(value)
    }

    /// Returns a literal as is and replaces the PREPARED marker with the
    /// next runtime value.
    pub(crate) fn resolve(&mut self, value: &QueryValue) -> Result<SqlValue> {
        match value {
            QueryValue::Literal(literal) => Ok(literal.clone()),
            QueryValue::Prepared => self.next_value(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.position)
    }

    /// Reports runtime values that no marker consumed.
    pub(crate) fn finish(&self, kind: &'static str) {
        let unused = self.remaining();
        if unused > 0 {
            debug!(kind, unused, "Ignoring extra runtime values");
        }
    }
}

/// Compiles statements for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlCompiler<'d> {
    dialect: &'d Dialect,
}

impl<'d> SqlCompiler<'d> {
    /// Creates a compiler for `dialect`.
    #[must_use]
    pub const fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &'d Dialect {
        self.dialect
    }

    /// Compiles any statement.
    pub fn compile(&self, statement: &Statement, values: &[SqlValue]) -> Result<CompiledQuery> {
        match statement {
            Statement::Find(s) => self.find(s, values),
            Statement::Insert(s) => self.insert(s, values),
            Statement::Update(s) => self.update(s, values),
            Statement::Delete(s) => self.delete(s, values),
            Statement::Replace(s) => self.replace(s, values),
            Statement::Create(s) => self.create(s, values),
            Statement::Drop(s) => self.drop(s),
            Statement::Clear(s) => Ok(self.clear(s)),
            Statement::Count(s) => self.count(s, values),
        }
    }

    /// Compiles a select.
    pub fn find(&self, statement: &FindStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        let mut cursor = ValueCursor::new(values);
        let (sql, params) = self.select(statement, &mut cursor)?;
        cursor.finish("find");
        Ok(self.traced("find", CompiledQuery::new(sql, params)))
    }

    /// Compiles an update.
    pub fn update(&self, statement: &UpdateStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        let mut cursor = ValueCursor::new(values);
        let mut search = SearchClauses::new(self.dialect, "update");
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for entry in &statement.entries {
            if let Entry::Set(set) = entry {
                assignments.push(self.assignment(set));
                params.push(cursor.resolve(&set.value)?);
            } else {
                search.push(entry, &mut cursor)?;
            }
        }
        if assignments.is_empty() {
            return Err(QueryError::NoAssignments(statement.collection.name.clone()));
        }
        cursor.finish("update");
        let (clauses, search_params) = search.finish();
        params.extend(search_params);
        let sql = format!(
            "UPDATE {} SET {}{clauses}",
            self.dialect.table(&statement.collection),
            assignments.join(",")
        );
        Ok(self.traced("update", CompiledQuery::new(sql, params)))
    }

    /// Compiles a delete.
    pub fn delete(&self, statement: &DeleteStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        let mut cursor = ValueCursor::new(values);
        let mut search = SearchClauses::new(self.dialect, "delete");
        for entry in &statement.entries {
            search.push(entry, &mut cursor)?;
        }
        cursor.finish("delete");
        let (clauses, params) = search.finish();
        let sql = format!(
            "DELETE FROM {} {clauses}",
            self.dialect.table(&statement.collection)
        );
        Ok(self.traced("delete", CompiledQuery::new(sql, params)))
    }

    /// Compiles a drop. Databases can only be dropped on remote backends.
    pub fn drop(&self, statement: &DropStatement) -> Result<CompiledQuery> {
        let sql = match &statement.target {
            DropTarget::Collection(collection) => {
                format!("DROP TABLE {}", self.dialect.table(collection))
            }
            DropTarget::Database(database) => match self.dialect.environment() {
                Environment::Remote => {
                    format!("DROP DATABASE {}", self.dialect.quote_identifier(database))
                }
                Environment::Local => {
                    return Err(QueryError::unsupported(self.dialect.name(), "drop database"));
                }
            },
        };
        Ok(self.traced("drop", CompiledQuery::new(sql, Vec::new())))
    }

    /// Compiles the removal of every row.
    #[must_use]
    pub fn clear(&self, statement: &ClearStatement) -> CompiledQuery {
        let sql = format!("DELETE FROM {}", self.dialect.table(&statement.collection));
        self.traced("clear", CompiledQuery::new(sql, Vec::new()))
    }

    /// Compiles a row count into a `size` column.
    pub fn count(&self, statement: &CountStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        let mut cursor = ValueCursor::new(values);
        let mut search = SearchClauses::new(self.dialect, "count");
        for entry in &statement.entries {
            search.push(entry, &mut cursor)?;
        }
        cursor.finish("count");
        let (clauses, params) = search.finish();
        let sql = format!(
            "SELECT COUNT(*) AS {} FROM {} {clauses}",
            self.dialect.quote_identifier(COUNT_COLUMN),
            self.dialect.table(&statement.collection)
        );
        Ok(self.traced("count", CompiledQuery::new(sql, params)))
    }

    pub(crate) fn select(
        &self,
        statement: &FindStatement,
        cursor: &mut ValueCursor<'_>,
    ) -> Result<(String, Vec<SqlValue>)> {
        let mut search = SearchClauses::new(self.dialect, "find");
        for entry in &statement.entries {
            search.push(entry, cursor)?;
        }
        let (clauses, params) = search.finish();
        let sql = format!(
            "SELECT {} FROM {} {clauses}",
            self.projection(&statement.projection),
            self.dialect.table(&statement.collection)
        );
        Ok((sql, params))
    }

    fn projection(&self, projection: &[GetEntry]) -> String {
        if projection.is_empty() {
            return String::from("*");
        }
        projection
            .iter()
            .map(|get| {
                let column = self.target(&get.field, get.aggregation);
                match &get.alias {
                    Some(alias) => format!("{column} AS {}", self.dialect.quote_identifier(alias)),
                    None => column,
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn assignment(&self, set: &SetEntry) -> String {
        let field = self.dialect.field(&set.field);
        match set.operator {
            Some(operator) => format!("{field}={field}{}?", operator.symbol()),
            None => format!("{field}=?"),
        }
    }

    /// Renders a field, wrapped in its aggregation if any.
    pub(crate) fn target(&self, field: &FieldRef, aggregation: Option<Aggregation>) -> String {
        let field = self.dialect.field(field);
        match aggregation {
            Some(aggregation) => format!("{aggregation}({field})"),
            None => field,
        }
    }

    fn traced(&self, kind: &'static str, query: CompiledQuery) -> CompiledQuery {
        debug!(
            dialect = self.dialect.name(),
            kind,
            sql = %query.sql,
            params = query.params.len(),
            "Compiled query"
        );
        query
    }
}
