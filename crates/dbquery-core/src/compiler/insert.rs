//! Inserts and replaces.

use crate::dialect::ReplaceStyle;
use crate::entry::Entry;
use crate::error::{QueryError, Result};
use crate::statement::{InsertStatement, ReplaceStatement};
use crate::value::SqlValue;

use super::{CompiledQuery, SqlCompiler, ValueCursor};

impl SqlCompiler<'_> {
    /// Compiles an insert of one or more rows.
    ///
    /// Each field contributes its explicit values to the first rows; every
    /// slot left over, and every PREPARED marker, takes the next runtime
    /// value. The total must split into whole rows. Values are bound row by
    /// row.
    pub fn insert(&self, statement: &InsertStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        let rows = insert_rows(statement, values)?;
        let fields = statement.entries.len();
        let row_count = rows.len();
        let params: Vec<SqlValue> = rows.into_iter().flatten().collect();

        let columns: Vec<String> = statement
            .entries
            .iter()
            .map(|e| self.dialect.quote_identifier(&e.field))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {};",
            self.dialect.table(&statement.collection),
            columns.join(","),
            row_groups(row_count, fields)
        );
        Ok(self.traced("insert", CompiledQuery::new(sql, params)))
    }

    /// Compiles a replace.
    ///
    /// Only dialects with `REPLACE INTO` support it, and only as a plain
    /// keyed upsert: filters and arithmetic have no equivalent there.
    pub fn replace(&self, statement: &ReplaceStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        if self.dialect.replace_style() == ReplaceStyle::Unsupported {
            return Err(self.unsupported("replace"));
        }
        let mut cursor = ValueCursor::new(values);
        let mut columns = Vec::new();
        let mut params = Vec::new();
        for entry in &statement.entries {
            let Entry::Set(set) = entry else {
                return Err(self.unsupported("replace with a filter"));
            };
            if set.operator.is_some() {
                return Err(QueryError::InsertArithmetic(set.field.to_string()));
            }
            columns.push(self.dialect.field(&set.field));
            params.push(cursor.resolve(&set.value)?);
        }
        if columns.is_empty() {
            return Err(QueryError::NoAssignments(statement.collection.name.clone()));
        }
        cursor.finish("replace");
        let sql = format!(
            "REPLACE INTO {} ({}) VALUES {};",
            self.dialect.table(&statement.collection),
            columns.join(","),
            row_groups(1, columns.len())
        );
        Ok(self.traced("replace", CompiledQuery::new(sql, params)))
    }

    fn unsupported(&self, operation: &str) -> QueryError {
        QueryError::unsupported(self.dialect.name(), operation)
    }
}

/// Groups explicit and runtime values into rows, one value per field.
pub(crate) fn insert_rows(statement: &InsertStatement, values: &[SqlValue]) -> Result<Vec<Vec<SqlValue>>> {
    let entries = &statement.entries;
    if entries.is_empty() {
        return Err(QueryError::EmptyInsert(statement.collection.name.clone()));
    }
    let fields = entries.len();
    let explicit: usize = entries.iter().map(|e| e.values.len()).sum();
    let markers = entries
        .iter()
        .flat_map(|e| e.values.iter())
        .filter(|v| v.is_prepared())
        .count();
    let total = explicit + values.len().saturating_sub(markers);
    if total == 0 {
        return Err(QueryError::EmptyInsert(statement.collection.name.clone()));
    }
    if total % fields != 0 {
        return Err(QueryError::UnbalancedInsert {
            values: total,
            fields,
        });
    }
    let rows = total / fields;
    if let Some(entry) = entries.iter().find(|e| e.values.len() > rows) {
        return Err(QueryError::InsertOverflow {
            field: entry.field.clone(),
            values: entry.values.len(),
            rows,
        });
    }

    let mut cursor = ValueCursor::new(values);
    let mut grouped = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut group = Vec::with_capacity(fields);
        for entry in entries {
            let value = match entry.values.get(row) {
                Some(value) => cursor.resolve(value)?,
                None => cursor.next_value()?,
            };
            group.push(value);
        }
        grouped.push(group);
    }
    Ok(grouped)
}

fn row_groups(rows: usize, fields: usize) -> String {
    let row = format!("({})", vec!["?"; fields].join(","));
    vec![row; rows].join(",")
}
