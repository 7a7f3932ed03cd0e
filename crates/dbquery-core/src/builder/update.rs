use crate::builder::SearchQuery;
use crate::collection::Collection;
use crate::entry::{ArithmeticOperator, Entry, SetEntry};
use crate::executor::ExecutionMode;
use crate::field::FieldRef;
use crate::statement::UpdateStatement;
use crate::value::{IntoQueryValue, QueryValue};

/// Assignments on top of a search.
///
/// Arithmetic assignments apply the operator to the current value, as in
/// `credits = credits + ?`.
pub trait ChangeQuery: SearchQuery {
    /// Appends an assignment.
    #[must_use]
    fn assign(self, field: &str, value: QueryValue, operator: Option<ArithmeticOperator>) -> Self {
        self.push(Entry::Set(SetEntry {
            field: FieldRef::parse(field),
            value,
            operator,
        }))
    }

    /// `field = value`.
    #[must_use]
    fn set(self, field: &str, value: impl IntoQueryValue) -> Self {
        self.assign(field, value.into_query_value(), None)
    }

    /// `field = field + value`.
    #[must_use]
    fn add(self, field: &str, value: impl IntoQueryValue) -> Self {
        self.assign(field, value.into_query_value(), Some(ArithmeticOperator::Add))
    }

    /// `field = field - value`.
    #[must_use]
    fn subtract(self, field: &str, value: impl IntoQueryValue) -> Self {
        self.assign(
            field,
            value.into_query_value(),
            Some(ArithmeticOperator::Subtract),
        )
    }

    /// `field = field * value`.
    #[must_use]
    fn multiply(self, field: &str, value: impl IntoQueryValue) -> Self {
        self.assign(
            field,
            value.into_query_value(),
            Some(ArithmeticOperator::Multiply),
        )
    }

    /// `field = field / value`.
    #[must_use]
    fn divide(self, field: &str, value: impl IntoQueryValue) -> Self {
        self.assign(field, value.into_query_value(), Some(ArithmeticOperator::Divide))
    }
}

/// An update of every row matching the search.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    collection: Collection,
    statement: UpdateStatement,
}

impl UpdateQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = UpdateStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }
}

executable_query!(UpdateQuery, UpdateStatement, ExecutionMode::Update);
search_query!(UpdateQuery);

impl ChangeQuery for UpdateQuery {}
