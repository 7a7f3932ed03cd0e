use crate::builder::ChangeQuery;
use crate::collection::Collection;
use crate::executor::ExecutionMode;
use crate::statement::ReplaceStatement;

/// A replace: insert, or overwrite the row with the same key.
///
/// SQL backends accept plain assignments only; the document store also
/// takes a search selecting the replaced documents.
#[derive(Debug, Clone)]
pub struct ReplaceQuery {
    collection: Collection,
    statement: ReplaceStatement,
}

impl ReplaceQuery {
    pub(crate) fn new(collection: Collection) -> Self {
        let statement = ReplaceStatement {
            collection: collection.reference().clone(),
            entries: Vec::new(),
        };
        Self {
            collection,
            statement,
        }
    }
}

executable_query!(ReplaceQuery, ReplaceStatement, ExecutionMode::Update);
search_query!(ReplaceQuery);

impl ChangeQuery for ReplaceQuery {}
