//! The entry model: one node per query operation.
//!
//! Builders append entries; compilers walk them. Entries only hold data and
//! never refer to a dialect.

use serde::{Deserialize, Serialize};

use crate::field::{Aggregation, FieldRef};
use crate::value::{QueryValue, SqlValue};

/// A collection (table) qualified by its database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Database name.
    pub database: String,
    /// Collection name.
    pub name: String,
}

impl CollectionRef {
    /// Creates a collection reference.
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
        }
    }
}

/// A search, join or assignment entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    /// A single predicate.
    Condition(ConditionEntry),
    /// AND / OR / NOT over nested entries.
    Operation(OperationEntry),
    /// A join with its ON equalities.
    Join(JoinEntry),
    /// Row limit and offset.
    Limit(LimitEntry),
    /// One sort key.
    OrderBy(OrderByEntry),
    /// One grouping key.
    GroupBy(GroupByEntry),
    /// One assignment.
    Set(SetEntry),
}

impl Entry {
    /// Returns the entry kind for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Condition(_) => "condition",
            Self::Operation(_) => "operation",
            Self::Join(_) => "join",
            Self::Limit(_) => "limit",
            Self::OrderBy(_) => "order_by",
            Self::GroupBy(_) => "group_by",
            Self::Set(_) => "set",
        }
    }

    /// Returns true if the entry renders into the filter clause.
    #[must_use]
    pub fn is_predicate(&self) -> bool {
        match self {
            Self::Condition(_) => true,
            Self::Operation(op) => op.entries.iter().any(Self::is_predicate),
            _ => false,
        }
    }

    /// Returns true if this entry, or a nested one, is a limit.
    #[must_use]
    pub fn contains_limit(&self) -> bool {
        match self {
            Self::Limit(_) => true,
            Self::Operation(op) => op.entries.iter().any(Self::contains_limit),
            _ => false,
        }
    }
}

/// Predicate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// `field = value`.
    Equals,
    /// `field LIKE pattern`.
    Like,
    /// `field < value`.
    Lower,
    /// `field > value`.
    Higher,
    /// `field IS NULL`.
    Null,
    /// `field IN (values)`.
    In,
    /// `field BETWEEN value AND upper`.
    Between,
}

/// One predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    /// Predicate kind.
    pub kind: ConditionKind,
    /// Compared field.
    pub field: FieldRef,
    /// Compared value. Unused by `Null`.
    pub value: QueryValue,
    /// Aggregation wrapped around the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    /// Upper bound of a `BETWEEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<QueryValue>,
}

/// Boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Negation.
    Not,
}

impl OperationKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

/// A boolean operator over nested entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    /// Operator.
    pub kind: OperationKind,
    /// Operands in declaration order.
    pub entries: Vec<Entry>,
}

/// Join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT JOIN`.
    Left,
    /// `RIGHT JOIN`.
    Right,
    /// `FULL JOIN`.
    Full,
}

impl JoinType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
        }
    }
}

/// A join clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinEntry {
    /// Joined collection.
    pub collection: CollectionRef,
    /// Join type.
    pub join_type: JoinType,
    /// ON equalities, joined with AND.
    pub on: Vec<JoinOnEntry>,
}

/// `collection1.column1 = collection2.column2` inside a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinOnEntry {
    /// Left-hand collection.
    pub collection1: CollectionRef,
    /// Left-hand column.
    pub column1: String,
    /// Right-hand collection; the column is left unqualified without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection2: Option<CollectionRef>,
    /// Right-hand column.
    pub column2: String,
}

/// Row limit and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitEntry {
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows skipped before the first one returned.
    pub offset: u64,
}

/// Sort directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SearchOrder {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByEntry {
    /// Sorted field.
    pub field: FieldRef,
    /// Direction.
    pub order: SearchOrder,
    /// Aggregation wrapped around the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

/// One grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByEntry {
    /// Grouped field.
    pub field: FieldRef,
    /// Aggregation wrapped around the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

/// Arithmetic applied against the current column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOperator {
    /// `field + value`.
    Add,
    /// `field - value`.
    Subtract,
    /// `field * value`.
    Multiply,
    /// `field / value`.
    Divide,
}

impl ArithmeticOperator {
    /// Returns the SQL operator symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }
}

/// One assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Assigned field.
    pub field: FieldRef,
    /// Assigned value or operand.
    pub value: QueryValue,
    /// Arithmetic against the current value; plain assignment when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ArithmeticOperator>,
}

/// One projected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEntry {
    /// Projected field.
    pub field: FieldRef,
    /// Aggregation wrapped around the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    /// Output column name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One inserted field with the values of every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertEntry {
    /// Field name.
    pub field: String,
    /// One value per row; missing trailing rows come from runtime values.
    #[serde(default)]
    pub values: Vec<QueryValue>,
}

/// Abstract column types mapped by each dialect's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Double precision float.
    Double,
    /// Exact decimal.
    Decimal,
    /// Single precision float.
    Float,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Single character.
    Char,
    /// Bounded string.
    String,
    /// Unbounded text.
    LongText,
    /// Date.
    Date,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// Binary data.
    Binary,
    /// UUID.
    Uuid,
    /// Serialized document.
    Document,
    /// Boolean.
    Boolean,
}

impl DataType {
    /// Returns true for types whose default literals are quoted.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::LongText | Self::Char)
    }
}

/// Column options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOption {
    /// Primary key column.
    PrimaryKey,
    /// Generated ascending value.
    AutoIncrement,
    /// Rejects NULL.
    NotNull,
    /// Unique values.
    Unique,
    /// Secondary index.
    Index,
    /// Unique secondary index.
    UniqueIndex,
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// The backend default; rendered as `DEFAULT`.
    Default,
    /// `CASCADE`.
    Cascade,
    /// `SET NULL`.
    SetNull,
}

impl ForeignKeyAction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
        }
    }
}

/// The referenced side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced collection.
    pub collection: CollectionRef,
    /// Referenced field.
    pub field: String,
    /// Action on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKey {
    /// References `field` of `collection` with backend default actions.
    pub fn new(collection: CollectionRef, field: impl Into<String>) -> Self {
        Self {
            collection,
            field: field.into(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the delete action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the update action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Column name.
    pub field: String,
    /// Abstract type.
    pub data_type: DataType,
    /// Explicit size; the dialect default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SqlValue>,
    /// Column options.
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl FieldEntry {
    /// Returns true if the option is set.
    #[must_use]
    pub fn has(&self, option: FieldOption) -> bool {
        self.options.contains(&option)
    }
}

/// A foreign key constraint on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEntry {
    /// Constrained column.
    pub field: String,
    /// Referenced column.
    pub foreign_key: ForeignKey,
}

/// A DDL entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreateEntry {
    /// Column definition.
    Field(FieldEntry),
    /// Foreign key constraint.
    ForeignKey(ForeignKeyEntry),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(field: &str) -> Entry {
        Entry::Condition(ConditionEntry {
            kind: ConditionKind::Equals,
            field: FieldRef::parse(field),
            value: QueryValue::Prepared,
            aggregation: None,
            upper_bound: None,
        })
    }

    #[test]
    fn test_empty_operation_is_not_predicate() {
        let empty = Entry::Operation(OperationEntry {
            kind: OperationKind::And,
            entries: vec![Entry::Limit(LimitEntry {
                limit: 1,
                offset: 0,
            })],
        });
        assert!(!empty.is_predicate());
        assert!(empty.contains_limit());
        assert!(condition("a").is_predicate());
    }

    #[test]
    fn test_between_keeps_aggregation_and_bound() {
        let entry = Entry::Condition(ConditionEntry {
            kind: ConditionKind::Between,
            field: FieldRef::plain("total"),
            value: QueryValue::Literal(SqlValue::Int(1)),
            aggregation: Some(Aggregation::Sum),
            upper_bound: Some(QueryValue::Prepared),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["aggregation"], "sum");
        assert_eq!(json["upper_bound"], "prepared");
        let parsed: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_entry_json_is_tagged() {
        let json = serde_json::to_value(condition("users.name")).unwrap();
        assert_eq!(json["type"], "condition");
        assert_eq!(json["kind"], "equals");
        assert_eq!(json["field"]["collection"], "users");
        assert_eq!(json["value"], "prepared");
    }
}
