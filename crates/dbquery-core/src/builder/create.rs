use crate::builder::FindQuery;
use crate::collection::Collection;
use crate::entry::{CreateEntry, DataType, FieldEntry, FieldOption, ForeignKey, ForeignKeyEntry};
use crate::error::{QueryError, Result};
use crate::executor::ExecutionMode;
use crate::statement::CreateStatement;
use crate::value::SqlValue;

/// A table or collection definition.
#[derive(Debug, Clone)]
pub struct CreateQuery {
    collection: Collection,
    statement: CreateStatement,
}

impl CreateQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = CreateStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
            engine: None,
            include: None,
        };
        Self {
            collection,
            statement,
        }
    }

    /// Adds a column with the type's default size.
    #[must_use]
    pub fn field(self, name: &str, data_type: DataType) -> Self {
        self.field_with(name, data_type, None, None, &[])
    }

    /// Adds a column with an explicit size, default value and options.
    #[must_use]
    pub fn field_with(
        mut self,
        name: &str,
        data_type: DataType,
        size: Option<u32>,
        default: Option<SqlValue>,
        options: &[FieldOption],
    ) -> Self {
        self.statement.entries.push(CreateEntry::Field(FieldEntry {
            field: name.to_owned(),
            data_type,
            size,
            default,
            options: options.to_vec(),
        }));
        self
    }

    /// Adds a foreign key constraint on `field`.
    #[must_use]
    pub fn foreign_key(mut self, field: &str, foreign_key: ForeignKey) -> Self {
        self.statement
            .entries
            .push(CreateEntry::ForeignKey(ForeignKeyEntry {
                field: field.to_owned(),
                foreign_key,
            }));
        self
    }

    /// Sets the storage engine where the backend has one.
    #[must_use]
    pub fn engine(mut self, engine: &str) -> Self {
        self.statement.engine = Some(engine.to_owned());
        self
    }

    /// Fills the new table with the rows of `query`.
    ///
    /// # Errors
    ///
    /// Fails when a query is already included.
    pub fn include(mut self, query: FindQuery) -> Result<Self> {
        if self.statement.include.is_some() {
            return Err(QueryError::DuplicateInclude);
        }
        self.statement.include = Some(Box::new(query.into_statement()));
        Ok(self)
    }
}

executable_query!(CreateQuery, CreateStatement, ExecutionMode::Update);
