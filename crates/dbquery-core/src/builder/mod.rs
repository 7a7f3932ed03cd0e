//! Fluent query builders.
//!
//! Builders are created from a [`Collection`](crate::Collection) and append
//! entries in call order. Misuse is reported by the offending call, so it
//! never reaches the compiler.

/// Statement access and execution shared by every builder.
macro_rules! executable_query {
    ($query:ident, $statement:ident, $mode:expr) => {
        impl $query {
            /// Returns the collection handle.
            #[must_use]
            pub const fn collection(&self) -> &$crate::collection::Collection {
                &self.collection
            }

            /// Returns the statement built so far.
            #[must_use]
            pub const fn statement(&self) -> &$statement {
                &self.statement
            }

            /// Releases the statement.
            #[must_use]
            pub fn into_statement(self) -> $statement {
                self.statement
            }

            /// Compiles the query for the collection's driver.
            ///
            /// # Errors
            ///
            /// Fails when the statement cannot be expressed with `values`.
            pub fn compile(
                &self,
                values: &[$crate::value::SqlValue],
            ) -> $crate::error::Result<$crate::executor::Command> {
                let statement = $crate::statement::Statement::from(self.statement.clone());
                self.collection.driver().compile(&statement, values)
            }

            /// Compiles and executes the query.
            ///
            /// # Errors
            ///
            /// Fails on compile errors and on executor errors.
            pub fn execute(
                &self,
                values: &[$crate::value::SqlValue],
            ) -> $crate::error::Result<$crate::result::QueryResult> {
                let statement = $crate::statement::Statement::from(self.statement.clone());
                self.collection.driver().run(&statement, values, &$mode)
            }

            /// Executes the query on the blocking worker pool.
            ///
            /// # Errors
            ///
            /// As [`Self::execute`], plus worker failures.
            pub async fn execute_async(
                self,
                values: Vec<$crate::value::SqlValue>,
            ) -> $crate::error::Result<$crate::result::QueryResult> {
                let driver = std::sync::Arc::clone(self.collection.driver());
                let statement = $crate::statement::Statement::from(self.statement);
                driver.run_async(statement, values, $mode).await
            }
        }

        impl From<$query> for $crate::statement::Statement {
            fn from(query: $query) -> Self {
                Self::from(query.statement)
            }
        }
    };
}

/// Search access over a builder whose statement holds an entry list.
macro_rules! search_query {
    ($query:ident) => {
        impl $crate::builder::SearchQuery for $query {
            fn collection(&self) -> &$crate::collection::Collection {
                &self.collection
            }

            fn entries(&self) -> &[$crate::entry::Entry] {
                &self.statement.entries
            }

            fn entries_mut(&mut self) -> &mut Vec<$crate::entry::Entry> {
                &mut self.statement.entries
            }
        }
    };
}

mod count;
mod create;
mod delete;
mod find;
mod group;
mod insert;
mod replace;
mod search;
mod update;

pub(crate) use count::size_of;
pub use count::CountQuery;
pub use create::CreateQuery;
pub use delete::DeleteQuery;
pub use find::FindQuery;
pub use group::QueryGroup;
pub use insert::InsertQuery;
pub use replace::ReplaceQuery;
pub use search::{IntoGroup, SearchQuery};
pub use update::{ChangeQuery, UpdateQuery};
