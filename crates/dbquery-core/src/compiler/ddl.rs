//! Table definitions.

use tracing::warn;

use crate::dialect::{AutoIncrement, DefaultLiteral, IndexStyle};
use crate::entry::{
    CollectionRef, CreateEntry, DataType, FieldEntry, FieldOption, ForeignKeyAction, ForeignKeyEntry,
};
use crate::error::{QueryError, Result};
use crate::statement::CreateStatement;
use crate::value::SqlValue;

use super::{CompiledQuery, SqlCompiler, ValueCursor};

const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Deterministic name for an index or constraint on one column.
fn constraint_name(collection: &CollectionRef, field: &str, suffix: &str) -> String {
    format!("{}_{field}_{suffix}", collection.name)
        .chars()
        .take(MAX_IDENTIFIER_LENGTH)
        .collect()
}

impl SqlCompiler<'_> {
    /// Compiles a `CREATE TABLE IF NOT EXISTS`.
    ///
    /// On dialects with [`IndexStyle::Separate`], index statements are
    /// returned in [`CompiledQuery::additional_statements`].
    pub fn create(&self, statement: &CreateStatement, values: &[SqlValue]) -> Result<CompiledQuery> {
        if statement.entries.is_empty() {
            return Err(QueryError::MissingField);
        }
        let mut definitions = Vec::with_capacity(statement.entries.len());
        let mut params = Vec::new();
        let mut additional = Vec::new();
        for entry in &statement.entries {
            let definition = match entry {
                CreateEntry::Field(field) => {
                    self.column(&statement.collection, field, &mut params, &mut additional)?
                }
                CreateEntry::ForeignKey(foreign_key) => {
                    self.foreign_key(&statement.collection, foreign_key)?
                }
            };
            definitions.push(definition);
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {}({})",
            self.dialect.table(&statement.collection),
            definitions.join(",")
        );
        if let Some(engine) = &statement.engine {
            if self.dialect.supports_engine() {
                sql.push_str(&format!(" ENGINE={engine}"));
            } else {
                warn!(
                    dialect = self.dialect.name(),
                    engine = %engine,
                    "Ignoring storage engine hint"
                );
            }
        }
        if let Some(include) = &statement.include {
            if !self.dialect.supports_create_select() {
                return Err(QueryError::unsupported(
                    self.dialect.name(),
                    "create with an included query",
                ));
            }
            let mut cursor = ValueCursor::new(values);
            let (select, select_params) = self.select(include, &mut cursor)?;
            cursor.finish("create");
            sql.push_str(" AS ");
            sql.push_str(select.trim_end());
            params.extend(select_params);
        }
        sql.push(';');

        let mut query = CompiledQuery::new(sql, params);
        query.additional_statements = additional;
        Ok(self.traced("create", query))
    }

    fn column(
        &self,
        collection: &CollectionRef,
        field: &FieldEntry,
        params: &mut Vec<SqlValue>,
        additional: &mut Vec<String>,
    ) -> Result<String> {
        if field.field.is_empty() {
            return Err(QueryError::MissingField);
        }
        let info = self.dialect.type_info(field.data_type).ok_or_else(|| {
            QueryError::unsupported(self.dialect.name(), format!("data type {:?}", field.data_type))
        })?;
        let serial = field.has(FieldOption::AutoIncrement)
            && *self.dialect.auto_increment() == AutoIncrement::Serial;

        let mut column = self.dialect.quote_identifier(&field.field);
        column.push(' ');
        if serial {
            column.push_str(if field.data_type == DataType::Long {
                "BIGSERIAL"
            } else {
                "SERIAL"
            });
        } else {
            column.push_str(&info.render(field.size));
            if let Some(default) = &field.default {
                self.default_value(&mut column, field.data_type, default, params);
            }
        }

        let mut inline_indexes = Vec::new();
        for option in &field.options {
            match option {
                FieldOption::PrimaryKey => column.push_str(" PRIMARY KEY"),
                FieldOption::NotNull => column.push_str(" NOT NULL"),
                FieldOption::Unique => column.push_str(" UNIQUE"),
                FieldOption::AutoIncrement => {
                    if let AutoIncrement::Keyword(keyword) = self.dialect.auto_increment() {
                        column.push_str(keyword);
                    }
                }
                FieldOption::Index | FieldOption::UniqueIndex => {
                    let unique = *option == FieldOption::UniqueIndex;
                    let name = constraint_name(collection, &field.field, if unique { "unique" } else { "index" });
                    let keyword = if unique { "UNIQUE INDEX" } else { "INDEX" };
                    match self.dialect.index_style() {
                        IndexStyle::Inline => inline_indexes.push(format!(
                            ",{keyword} {}({})",
                            self.dialect.quote_identifier(&name),
                            self.dialect.quote_identifier(&field.field)
                        )),
                        IndexStyle::Separate => additional.push(format!(
                            "CREATE {keyword} IF NOT EXISTS {} ON {}({});",
                            self.dialect.quote_identifier(&name),
                            self.dialect.table(collection),
                            self.dialect.quote_identifier(&field.field)
                        )),
                    }
                }
            }
        }
        if self.dialect.primary_key_unique()
            && field.has(FieldOption::PrimaryKey)
            && !field.has(FieldOption::Unique)
        {
            column.push_str(" UNIQUE");
        }
        column.extend(inline_indexes);
        Ok(column)
    }

    fn default_value(
        &self,
        column: &mut String,
        data_type: DataType,
        default: &SqlValue,
        params: &mut Vec<SqlValue>,
    ) {
        match self.dialect.default_literal() {
            DefaultLiteral::Bound => {
                column.push_str(" DEFAULT ?");
                params.push(default.clone());
            }
            DefaultLiteral::Inline => {
                let literal = if data_type.is_textual() {
                    default.to_sql_text()
                } else {
                    default.to_sql_inline()
                };
                column.push_str(" DEFAULT ");
                column.push_str(&literal);
            }
        }
    }

    fn foreign_key(&self, collection: &CollectionRef, entry: &ForeignKeyEntry) -> Result<String> {
        if entry.field.is_empty() || entry.foreign_key.field.is_empty() {
            return Err(QueryError::MissingField);
        }
        let reference = &entry.foreign_key;
        let mut constraint = format!(
            "CONSTRAINT {} FOREIGN KEY({}) REFERENCES {}({})",
            self.dialect
                .quote_identifier(&constraint_name(collection, &entry.field, "fk")),
            self.dialect.quote_identifier(&entry.field),
            self.dialect.table(&reference.collection),
            self.dialect.quote_identifier(&reference.field)
        );
        for (keyword, action) in [("DELETE", reference.on_delete), ("UPDATE", reference.on_update)] {
            if let Some(action) = action.filter(|a| *a != ForeignKeyAction::Default) {
                constraint.push_str(&format!(" ON {keyword} {}", action.as_str()));
            }
        }
        Ok(constraint)
    }
}
