use crate::collection::Collection;
use crate::executor::ExecutionMode;
use crate::statement::DeleteStatement;

/// A delete of every row matching the search.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    collection: Collection,
    statement: DeleteStatement,
}

impl DeleteQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = DeleteStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }
}

executable_query!(DeleteQuery, DeleteStatement, ExecutionMode::Update);
search_query!(DeleteQuery);
