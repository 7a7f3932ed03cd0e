//! Owned, serializable statements.
//!
//! A builder is a collection handle wrapped around one of these. Compilers
//! only ever see statements.

use serde::{Deserialize, Serialize};

use crate::entry::{CollectionRef, CreateEntry, Entry, GetEntry, InsertEntry};

/// A select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindStatement {
    /// Queried collection.
    pub collection: CollectionRef,
    /// Projected columns; empty selects everything.
    #[serde(default)]
    pub projection: Vec<GetEntry>,
    /// Search entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// An insert of one or more rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Target collection.
    pub collection: CollectionRef,
    /// One entry per field.
    #[serde(default)]
    pub entries: Vec<InsertEntry>,
}

/// An update; `Set` entries form the assignment list, the rest the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Target collection.
    pub collection: CollectionRef,
    /// Assignment and search entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Target collection.
    pub collection: CollectionRef,
    /// Search entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A replace; `Set` entries describe the replacement, the rest the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceStatement {
    /// Target collection.
    pub collection: CollectionRef,
    /// Assignment and search entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A table/collection definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStatement {
    /// Created collection.
    pub collection: CollectionRef,
    /// Column and constraint definitions.
    #[serde(default)]
    pub entries: Vec<CreateEntry>,
    /// Storage engine hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Select whose rows populate the new table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Box<FindStatement>>,
}

/// What a drop removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    /// One collection and its rows.
    Collection(CollectionRef),
    /// A whole database.
    Database(String),
}

/// Removal of a collection or a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropStatement {
    /// Removed object.
    pub target: DropTarget,
}

/// Removal of every row while keeping the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearStatement {
    /// Emptied collection.
    pub collection: CollectionRef,
}

/// Number of rows matching a search, returned in a `size` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountStatement {
    /// Counted collection.
    pub collection: CollectionRef,
    /// Search entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Any statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// Select.
    Find(FindStatement),
    /// Insert.
    Insert(InsertStatement),
    /// Update.
    Update(UpdateStatement),
    /// Delete.
    Delete(DeleteStatement),
    /// Replace.
    Replace(ReplaceStatement),
    /// Create.
    Create(CreateStatement),
    /// Drop.
    Drop(DropStatement),
    /// Clear.
    Clear(ClearStatement),
    /// Count.
    Count(CountStatement),
}

impl Statement {
    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Find(_) => "find",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Replace(_) => "replace",
            Self::Create(_) => "create",
            Self::Drop(_) => "drop",
            Self::Clear(_) => "clear",
            Self::Count(_) => "count",
        }
    }

    /// Returns the target collection; `None` when a whole database is
    /// dropped.
    #[must_use]
    pub const fn collection(&self) -> Option<&CollectionRef> {
        match self {
            Self::Find(s) => Some(&s.collection),
            Self::Insert(s) => Some(&s.collection),
            Self::Update(s) => Some(&s.collection),
            Self::Delete(s) => Some(&s.collection),
            Self::Replace(s) => Some(&s.collection),
            Self::Create(s) => Some(&s.collection),
            Self::Drop(s) => match &s.target {
                DropTarget::Collection(collection) => Some(collection),
                DropTarget::Database(_) => None,
            },
            Self::Clear(s) => Some(&s.collection),
            Self::Count(s) => Some(&s.collection),
        }
    }
}

macro_rules! statement_from {
    ($($variant:ident($ty:ty)),*) => {
        $(
            impl From<$ty> for Statement {
                fn from(statement: $ty) -> Self {
                    Self::$variant(statement)
                }
            }
        )*
    };
}

statement_from!(
    Find(FindStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Replace(ReplaceStatement),
    Create(CreateStatement),
    Drop(DropStatement),
    Clear(ClearStatement),
    Count(CountStatement)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_from_json() {
        let json = r#"{
            "kind": "find",
            "collection": {"database": "shop", "name": "users"},
            "entries": [
                {"type": "condition", "kind": "equals", "field": {"field": "age"}, "value": {"literal": 18}},
                {"type": "limit", "limit": 10, "offset": 0}
            ]
        }"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(statement.kind(), "find");
        assert_eq!(statement.collection().map(|c| c.name.as_str()), Some("users"));
        let Statement::Find(find) = statement else {
            panic!("expected find");
        };
        assert_eq!(find.entries.len(), 2);
        assert!(find.projection.is_empty());
    }

    #[test]
    fn test_drop_database_has_no_collection() {
        let json = r#"{"kind": "drop", "target": {"database": "shop"}}"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(statement.kind(), "drop");
        assert!(statement.collection().is_none());
        assert_eq!(
            statement,
            Statement::Drop(DropStatement {
                target: DropTarget::Database(String::from("shop"))
            })
        );
    }
}
