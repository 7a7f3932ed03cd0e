//! Document-store translation.
//!
//! The same statements the SQL compiler consumes are translated into
//! MongoDB-style commands: an aggregation pipeline for finds, filter and
//! update documents for mutations. PREPARED markers are resolved exactly as
//! in SQL, in declaration order.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::compiler::{insert_rows, ValueCursor, COUNT_COLUMN};
use crate::entry::{
    ArithmeticOperator, CollectionRef, ConditionEntry, ConditionKind, CreateEntry, Entry,
    FieldOption, GetEntry, JoinEntry, JoinType, LimitEntry, OperationKind, SearchOrder,
};
use crate::error::{QueryError, Result};
use crate::field::{Aggregation, FieldRef};
use crate::statement::{
    ClearStatement, CountStatement, CreateStatement, DeleteStatement, DropStatement, DropTarget,
    FindStatement, InsertStatement, ReplaceStatement, Statement, UpdateStatement,
};
use crate::value::SqlValue;

const BACKEND: &str = "document store";

/// A translated document-store command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum DocumentCommand {
    /// Aggregation pipeline over a collection.
    Aggregate {
        /// Source collection.
        collection: String,
        /// Pipeline stages.
        pipeline: Vec<Value>,
    },
    /// Insert of whole documents.
    Insert {
        /// Target collection.
        collection: String,
        /// One document per row.
        documents: Vec<Value>,
    },
    /// Update of every matching document.
    Update {
        /// Target collection.
        collection: String,
        /// Filter document.
        filter: Value,
        /// Update operators.
        update: Value,
    },
    /// Delete of every matching document.
    Delete {
        /// Target collection.
        collection: String,
        /// Filter document.
        filter: Value,
    },
    /// Replacement of every matching document.
    Replace {
        /// Target collection.
        collection: String,
        /// Filter document.
        filter: Value,
        /// New document.
        replacement: Value,
    },
    /// Collection creation with its indexes.
    Create {
        /// Created collection.
        collection: String,
        /// Index specifications.
        indexes: Vec<Value>,
    },
    /// Removal of a collection.
    Drop {
        /// Dropped collection.
        collection: String,
    },
    /// Removal of a database.
    DropDatabase {
        /// Dropped database.
        database: String,
    },
}

impl DocumentCommand {
    /// Returns the target collection; `None` for a database drop.
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        match self {
            Self::Aggregate { collection, .. }
            | Self::Insert { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. }
            | Self::Replace { collection, .. }
            | Self::Create { collection, .. }
            | Self::Drop { collection } => Some(collection),
            Self::DropDatabase { .. } => None,
        }
    }

    /// Returns the command as one JSON document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Translates any statement.
pub fn compile(statement: &Statement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let command = match statement {
        Statement::Find(s) => find(s, values),
        Statement::Insert(s) => insert(s, values),
        Statement::Update(s) => update(s, values),
        Statement::Delete(s) => delete(s, values),
        Statement::Replace(s) => replace(s, values),
        Statement::Create(s) => create(s),
        Statement::Drop(s) => Ok(drop(s)),
        Statement::Clear(s) => Ok(clear(s)),
        Statement::Count(s) => count(s, values),
    }?;
    debug!(
        kind = statement.kind(),
        collection = command.collection().unwrap_or_default(),
        "Translated document command"
    );
    Ok(command)
}

/// Translates a find into an aggregation pipeline.
pub fn find(statement: &FindStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let mut cursor = ValueCursor::new(values);
    let mut translation = Translation::new(&statement.collection);
    for entry in &statement.entries {
        let filters = translation.entry(entry, &mut cursor)?;
        translation.filters.extend(filters);
    }
    cursor.finish("find");
    let pipeline = translation.pipeline(&statement.projection);
    Ok(DocumentCommand::Aggregate {
        collection: statement.collection.name.clone(),
        pipeline,
    })
}

/// Translates an insert into documents, one per row.
pub fn insert(statement: &InsertStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let rows = insert_rows(statement, values)?;
    let mut documents = Vec::with_capacity(rows.len());
    for row in rows {
        let mut document = Map::new();
        for (entry, value) in statement.entries.iter().zip(row) {
            document.insert(entry.field.clone(), to_json(value)?);
        }
        documents.push(Value::Object(document));
    }
    Ok(DocumentCommand::Insert {
        collection: statement.collection.name.clone(),
        documents,
    })
}

/// Translates an update into `$set`, `$inc` and `$mul` operators.
pub fn update(statement: &UpdateStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let mut cursor = ValueCursor::new(values);
    let mut translation = Translation::new(&statement.collection);
    let mut operators: Map<String, Value> = Map::new();
    for entry in &statement.entries {
        if let Entry::Set(set) = entry {
            let value = cursor.resolve(&set.value)?;
            let (operator, value) = match set.operator {
                None => ("$set", value),
                Some(ArithmeticOperator::Add) => ("$inc", value),
                Some(ArithmeticOperator::Subtract) => ("$inc", negate(value)?),
                Some(ArithmeticOperator::Multiply) => ("$mul", value),
                Some(ArithmeticOperator::Divide) => ("$mul", reciprocal(value)?),
            };
            let fields = operators
                .entry(operator)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(fields) = fields {
                fields.insert(translation.path(&set.field), to_json(value)?);
            }
        } else {
            let filters = translation.entry(entry, &mut cursor)?;
            translation.filters.extend(filters);
        }
    }
    if operators.is_empty() {
        return Err(QueryError::NoAssignments(statement.collection.name.clone()));
    }
    cursor.finish("update");
    let filter = translation.filter_only("update")?;
    Ok(DocumentCommand::Update {
        collection: statement.collection.name.clone(),
        filter,
        update: Value::Object(operators),
    })
}

/// Translates a delete into a filter.
pub fn delete(statement: &DeleteStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let mut cursor = ValueCursor::new(values);
    let mut translation = Translation::new(&statement.collection);
    for entry in &statement.entries {
        let filters = translation.entry(entry, &mut cursor)?;
        translation.filters.extend(filters);
    }
    cursor.finish("delete");
    Ok(DocumentCommand::Delete {
        collection: statement.collection.name.clone(),
        filter: translation.filter_only("delete")?,
    })
}

/// Translates a replace into a filter and the replacement document.
pub fn replace(statement: &ReplaceStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let mut cursor = ValueCursor::new(values);
    let mut translation = Translation::new(&statement.collection);
    let mut replacement = Map::new();
    for entry in &statement.entries {
        if let Entry::Set(set) = entry {
            if set.operator.is_some() {
                return Err(QueryError::InsertArithmetic(set.field.to_string()));
            }
            let value = cursor.resolve(&set.value)?;
            replacement.insert(translation.path(&set.field), to_json(value)?);
        } else {
            let filters = translation.entry(entry, &mut cursor)?;
            translation.filters.extend(filters);
        }
    }
    if replacement.is_empty() {
        return Err(QueryError::NoAssignments(statement.collection.name.clone()));
    }
    cursor.finish("replace");
    Ok(DocumentCommand::Replace {
        collection: statement.collection.name.clone(),
        filter: translation.filter_only("replace")?,
        replacement: Value::Object(replacement),
    })
}

/// Translates a create into a collection and its index specifications.
pub fn create(statement: &CreateStatement) -> Result<DocumentCommand> {
    if statement.include.is_some() {
        return Err(QueryError::unsupported(BACKEND, "create with an included query"));
    }
    if let Some(engine) = &statement.engine {
        warn!(engine = %engine, "Ignoring storage engine hint");
    }
    let mut indexes = Vec::new();
    for entry in &statement.entries {
        match entry {
            CreateEntry::Field(field) => {
                if field.field.is_empty() {
                    return Err(QueryError::MissingField);
                }
                let unique = field.has(FieldOption::Unique) || field.has(FieldOption::UniqueIndex);
                if unique || field.has(FieldOption::Index) {
                    let suffix = if unique { "unique" } else { "index" };
                    let mut key = Map::new();
                    key.insert(field.field.clone(), json!(1));
                    indexes.push(json!({
                        "key": key,
                        "name": format!("{}_{}_{suffix}", statement.collection.name, field.field),
                        "unique": unique,
                    }));
                }
            }
            CreateEntry::ForeignKey(_) => {
                return Err(QueryError::unsupported(BACKEND, "foreign key"));
            }
        }
    }
    Ok(DocumentCommand::Create {
        collection: statement.collection.name.clone(),
        indexes,
    })
}

/// Translates a drop of a collection or a database.
#[must_use]
pub fn drop(statement: &DropStatement) -> DocumentCommand {
    match &statement.target {
        DropTarget::Collection(collection) => DocumentCommand::Drop {
            collection: collection.name.clone(),
        },
        DropTarget::Database(database) => DocumentCommand::DropDatabase {
            database: database.clone(),
        },
    }
}

/// Translates a clear into a delete matching every document.
#[must_use]
pub fn clear(statement: &ClearStatement) -> DocumentCommand {
    DocumentCommand::Delete {
        collection: statement.collection.name.clone(),
        filter: json!({}),
    }
}

/// Translates a count into a pipeline ending in a `$count` stage.
pub fn count(statement: &CountStatement, values: &[SqlValue]) -> Result<DocumentCommand> {
    let mut cursor = ValueCursor::new(values);
    let mut translation = Translation::new(&statement.collection);
    for entry in &statement.entries {
        let filters = translation.entry(entry, &mut cursor)?;
        translation.filters.extend(filters);
    }
    cursor.finish("count");
    let mut pipeline = translation.pipeline(&[]);
    pipeline.push(json!({ "$count": COUNT_COLUMN }));
    Ok(DocumentCommand::Aggregate {
        collection: statement.collection.name.clone(),
        pipeline,
    })
}

/// Translation state for one statement.
struct Translation<'s> {
    collection: &'s CollectionRef,
    lookups: Vec<Value>,
    filters: Vec<Value>,
    groups: Vec<FieldRef>,
    sort: Map<String, Value>,
    limit: Option<LimitEntry>,
}

impl<'s> Translation<'s> {
    fn new(collection: &'s CollectionRef) -> Self {
        Self {
            collection,
            lookups: Vec::new(),
            filters: Vec::new(),
            groups: Vec::new(),
            sort: Map::new(),
            limit: None,
        }
    }

    /// Field path; fields of joined collections live under the join name.
    fn path(&self, field: &FieldRef) -> String {
        match &field.collection {
            Some(collection) if *collection != self.collection.name => {
                format!("{collection}.{}", field.field)
            }
            _ => field.field.clone(),
        }
    }

    /// Returns the filter documents produced by `entry`, recording joins,
    /// grouping, sorting and limits on the way.
    fn entry(&mut self, entry: &Entry, cursor: &mut ValueCursor<'_>) -> Result<Vec<Value>> {
        match entry {
            Entry::Condition(condition) => Ok(vec![self.condition(condition, cursor)?]),
            Entry::Operation(operation) => {
                let mut children = Vec::new();
                for child in &operation.entries {
                    children.extend(self.entry(child, cursor)?);
                }
                Ok(match operation.kind {
                    OperationKind::Not => children
                        .into_iter()
                        .map(|child| json!({ "$nor": [child] }))
                        .collect(),
                    _ if children.is_empty() => Vec::new(),
                    OperationKind::And => vec![json!({ "$and": children })],
                    OperationKind::Or => vec![json!({ "$or": children })],
                })
            }
            Entry::Join(join) => {
                self.lookup(join)?;
                Ok(Vec::new())
            }
            Entry::Limit(limit) => {
                if self.limit.replace(*limit).is_some() {
                    return Err(QueryError::DuplicateLimit);
                }
                Ok(Vec::new())
            }
            Entry::OrderBy(order) => {
                if order.aggregation.is_some() {
                    return Err(QueryError::unsupported(BACKEND, "aggregated sort key"));
                }
                let direction = match order.order {
                    SearchOrder::Asc => 1,
                    SearchOrder::Desc => -1,
                };
                self.sort.insert(self.path(&order.field), json!(direction));
                Ok(Vec::new())
            }
            Entry::GroupBy(group) => {
                if group.aggregation.is_some() {
                    return Err(QueryError::unsupported(BACKEND, "aggregated group key"));
                }
                self.groups.push(group.field.clone());
                Ok(Vec::new())
            }
            Entry::Set(_) => Err(QueryError::UnexpectedEntry {
                entry: entry.kind(),
                statement: "search",
            }),
        }
    }

    fn condition(&self, condition: &ConditionEntry, cursor: &mut ValueCursor<'_>) -> Result<Value> {
        if condition.aggregation.is_some() {
            return Err(QueryError::unsupported(BACKEND, "aggregated condition"));
        }
        let path = self.path(&condition.field);
        let predicate = match condition.kind {
            ConditionKind::Equals => json!({ "$eq": to_json(cursor.resolve(&condition.value)?)? }),
            ConditionKind::Lower => json!({ "$lt": to_json(cursor.resolve(&condition.value)?)? }),
            ConditionKind::Higher => json!({ "$gt": to_json(cursor.resolve(&condition.value)?)? }),
            ConditionKind::Like => match cursor.resolve(&condition.value)? {
                SqlValue::Text(pattern) => json!({ "$regex": like_to_regex(&pattern) }),
                _ => return Err(QueryError::unsupported(BACKEND, "LIKE with a non-text pattern")),
            },
            ConditionKind::Null => json!({ "$eq": null }),
            ConditionKind::In => {
                let values = match cursor.resolve(&condition.value)? {
                    SqlValue::List(values) => values,
                    value => vec![value],
                };
                if values.is_empty() {
                    return Err(QueryError::EmptyInList(condition.field.to_string()));
                }
                let values = values.into_iter().map(to_json).collect::<Result<Vec<_>>>()?;
                json!({ "$in": values })
            }
            ConditionKind::Between => {
                let upper = condition.upper_bound.as_ref().ok_or(QueryError::UnexpectedEntry {
                    entry: "between without upper bound",
                    statement: "search",
                })?;
                let lower = to_json(cursor.resolve(&condition.value)?)?;
                let upper = to_json(cursor.resolve(upper)?)?;
                json!({ "$gte": lower, "$lte": upper })
            }
        };
        let mut filter = Map::new();
        filter.insert(path, predicate);
        Ok(Value::Object(filter))
    }

    fn lookup(&mut self, join: &JoinEntry) -> Result<()> {
        let unwind = match join.join_type {
            JoinType::Inner => json!({ "$unwind": format!("${}", join.collection.name) }),
            JoinType::Left => json!({
                "$unwind": {
                    "path": format!("${}", join.collection.name),
                    "preserveNullAndEmptyArrays": true,
                }
            }),
            JoinType::Right | JoinType::Full => {
                return Err(QueryError::unsupported(
                    BACKEND,
                    format!("{} JOIN", join.join_type.as_str()),
                ));
            }
        };
        let mut variables = Map::new();
        let mut equalities = Vec::new();
        for (index, on) in join.on.iter().enumerate() {
            // The local side is whichever side is not the joined collection.
            let (local, foreign) = if on.collection1 == join.collection {
                (&on.column2, &on.column1)
            } else {
                (&on.column1, &on.column2)
            };
            let variable = format!("v{index}");
            equalities.push(json!({ "$eq": [format!("${foreign}"), format!("$${variable}")] }));
            variables.insert(variable, json!(format!("${local}")));
        }
        self.lookups.push(json!({
            "$lookup": {
                "from": join.collection.name,
                "let": variables,
                "pipeline": [{ "$match": { "$expr": { "$and": equalities } } }],
                "as": join.collection.name,
            }
        }));
        self.lookups.push(unwind);
        Ok(())
    }

    fn filter(&mut self) -> Value {
        let mut filters = std::mem::take(&mut self.filters);
        match filters.len() {
            0 => json!({}),
            1 => filters.remove(0),
            _ => json!({ "$and": filters }),
        }
    }

    /// Returns the filter of a mutation, which has no pipeline to carry
    /// joins, grouping, sorting or limits.
    fn filter_only(&mut self, statement: &str) -> Result<Value> {
        let extra = if !self.lookups.is_empty() {
            Some("join")
        } else if !self.groups.is_empty() {
            Some("group by")
        } else if !self.sort.is_empty() {
            Some("order by")
        } else if self.limit.is_some() {
            Some("limit")
        } else {
            None
        };
        if let Some(clause) = extra {
            return Err(QueryError::unsupported(BACKEND, format!("{clause} in {statement}")));
        }
        Ok(self.filter())
    }

    fn pipeline(mut self, projection: &[GetEntry]) -> Vec<Value> {
        let mut pipeline = std::mem::take(&mut self.lookups);
        if !self.filters.is_empty() {
            pipeline.push(json!({ "$match": self.filter() }));
        }
        let aggregated = projection.iter().any(|get| get.aggregation.is_some());
        if aggregated || !self.groups.is_empty() {
            pipeline.push(self.group(projection));
        } else if !projection.is_empty() {
            let mut fields = Map::new();
            for get in projection {
                let path = self.path(&get.field);
                match &get.alias {
                    Some(alias) => fields.insert(alias.clone(), json!(format!("${path}"))),
                    None => fields.insert(path, json!(1)),
                };
            }
            pipeline.push(json!({ "$project": fields }));
        }
        if !self.sort.is_empty() {
            pipeline.push(json!({ "$sort": self.sort }));
        }
        if let Some(limit) = self.limit {
            if limit.offset > 0 {
                pipeline.push(json!({ "$skip": limit.offset }));
            }
            pipeline.push(json!({ "$limit": limit.limit }));
        }
        pipeline
    }

    fn group(&self, projection: &[GetEntry]) -> Value {
        let id = if self.groups.is_empty() {
            Value::Null
        } else {
            let mut keys = Map::new();
            for field in &self.groups {
                keys.insert(field.field.clone(), json!(format!("${}", self.path(field))));
            }
            Value::Object(keys)
        };
        let mut group = Map::new();
        group.insert(String::from("_id"), id);
        for get in projection {
            let Some(aggregation) = get.aggregation else {
                continue;
            };
            let name = get.alias.clone().unwrap_or_else(|| {
                format!("{}_{}", aggregation.as_str().to_lowercase(), get.field.field)
            });
            let mut accumulator = Map::new();
            match aggregation {
                Aggregation::Count => accumulator.insert(String::from("$sum"), json!(1)),
                other => accumulator.insert(
                    format!("${}", other.as_str().to_lowercase()),
                    json!(format!("${}", self.path(&get.field))),
                ),
            };
            group.insert(name, Value::Object(accumulator));
        }
        json!({ "$group": group })
    }
}

fn to_json(value: SqlValue) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn negate(value: SqlValue) -> Result<SqlValue> {
    match value {
        SqlValue::Int(i) => i
            .checked_neg()
            .map(SqlValue::Int)
            .ok_or_else(|| QueryError::unsupported(BACKEND, "subtracting i64::MIN")),
        SqlValue::Float(f) => Ok(SqlValue::Float(-f)),
        _ => Err(QueryError::unsupported(BACKEND, "subtracting a non-numeric value")),
    }
}

#[allow(clippy::cast_precision_loss)]
fn reciprocal(value: SqlValue) -> Result<SqlValue> {
    let divisor = match value {
        SqlValue::Int(i) => i as f64,
        SqlValue::Float(f) => f,
        _ => return Err(QueryError::unsupported(BACKEND, "dividing by a non-numeric value")),
    };
    if divisor == 0.0 {
        return Err(QueryError::unsupported(BACKEND, "division by zero"));
    }
    Ok(SqlValue::Float(1.0 / divisor))
}

/// Converts a `LIKE` pattern into an anchored regular expression.
fn like_to_regex(pattern: &str) -> String {
    fn push_literal(regex: &mut String, c: char) {
        if "\\^$.|?*+()[]{}".contains(c) {
            regex.push('\\');
        }
        regex.push(c);
    }

    let mut regex = String::from("^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut regex, escaped);
                }
            }
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            c => push_literal(&mut regex, c),
        }
    }
    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{FieldEntry, InsertEntry, JoinOnEntry, OperationEntry, OrderByEntry, SetEntry};
    use crate::value::{Pattern, QueryValue};

    fn collection() -> CollectionRef {
        CollectionRef::new("shop", "users")
    }

    fn cond(kind: ConditionKind, field: &str, value: QueryValue) -> Entry {
        Entry::Condition(ConditionEntry {
            kind,
            field: FieldRef::parse(field),
            value,
            aggregation: None,
            upper_bound: None,
        })
    }

    fn lit(v: i64) -> QueryValue {
        QueryValue::Literal(SqlValue::Int(v))
    }

    fn select(entries: Vec<Entry>, projection: Vec<GetEntry>) -> FindStatement {
        FindStatement {
            collection: collection(),
            projection,
            entries,
        }
    }

    fn pipeline(command: DocumentCommand) -> Vec<Value> {
        match command {
            DocumentCommand::Aggregate { pipeline, .. } => pipeline,
            other => panic!("expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_like_to_regex() {
        assert_eq!(like_to_regex("ab%"), "^ab.*$");
        assert_eq!(like_to_regex("a_c"), "^a.c$");
        assert_eq!(like_to_regex(&Pattern::contains("1.5%").build()), "^.*1\\.5%.*$");
    }

    #[test]
    fn test_find_pipeline() {
        let statement = select(
            vec![
                Entry::Limit(LimitEntry { limit: 10, offset: 20 }),
                cond(ConditionKind::Equals, "age", QueryValue::Prepared),
                Entry::Operation(OperationEntry {
                    kind: OperationKind::Or,
                    entries: vec![
                        cond(ConditionKind::Higher, "score", lit(50)),
                        cond(ConditionKind::Null, "score", QueryValue::Literal(SqlValue::Null)),
                    ],
                }),
                Entry::OrderBy(OrderByEntry {
                    field: FieldRef::parse("name"),
                    order: SearchOrder::Desc,
                    aggregation: None,
                }),
            ],
            vec![],
        );
        let stages = pipeline(find(&statement, &[SqlValue::Int(18)]).unwrap());
        assert_eq!(
            stages,
            vec![
                json!({ "$match": { "$and": [
                    { "age": { "$eq": 18 } },
                    { "$or": [ { "score": { "$gt": 50 } }, { "score": { "$eq": null } } ] }
                ] } }),
                json!({ "$sort": { "name": -1 } }),
                json!({ "$skip": 20 }),
                json!({ "$limit": 10 }),
            ]
        );
    }

    #[test]
    fn test_not_and_between() {
        let between = Entry::Condition(ConditionEntry {
            kind: ConditionKind::Between,
            field: FieldRef::parse("age"),
            value: lit(18),
            aggregation: None,
            upper_bound: Some(lit(30)),
        });
        let statement = select(
            vec![Entry::Operation(OperationEntry {
                kind: OperationKind::Not,
                entries: vec![between],
            })],
            vec![],
        );
        let stages = pipeline(find(&statement, &[]).unwrap());
        assert_eq!(
            stages,
            vec![json!({ "$match": { "$nor": [ { "age": { "$gte": 18, "$lte": 30 } } ] } })]
        );
    }

    #[test]
    fn test_join_becomes_lookup() {
        let statement = select(
            vec![Entry::Join(JoinEntry {
                collection: CollectionRef::new("shop", "orders"),
                join_type: JoinType::Inner,
                on: vec![JoinOnEntry {
                    collection1: collection(),
                    column1: String::from("id"),
                    collection2: Some(CollectionRef::new("shop", "orders")),
                    column2: String::from("user_id"),
                }],
            })],
            vec![],
        );
        let stages = pipeline(find(&statement, &[]).unwrap());
        assert_eq!(stages[0]["$lookup"]["from"], "orders");
        assert_eq!(stages[0]["$lookup"]["let"]["v0"], "$id");
        assert_eq!(
            stages[0]["$lookup"]["pipeline"][0]["$match"]["$expr"]["$and"][0]["$eq"],
            json!(["$user_id", "$$v0"])
        );
        assert_eq!(stages[1], json!({ "$unwind": "$orders" }));
    }

    #[test]
    fn test_group_with_aggregated_projection() {
        let statement = select(
            vec![Entry::GroupBy(crate::entry::GroupByEntry {
                field: FieldRef::parse("city"),
                aggregation: None,
            })],
            vec![
                GetEntry {
                    field: FieldRef::parse("id"),
                    aggregation: Some(Aggregation::Count),
                    alias: Some(String::from("people")),
                },
                GetEntry {
                    field: FieldRef::parse("age"),
                    aggregation: Some(Aggregation::Avg),
                    alias: None,
                },
            ],
        );
        let stages = pipeline(find(&statement, &[]).unwrap());
        assert_eq!(
            stages,
            vec![json!({ "$group": {
                "_id": { "city": "$city" },
                "people": { "$sum": 1 },
                "avg_age": { "$avg": "$age" },
            } })]
        );
    }

    #[test]
    fn test_update_operators() {
        let set = |field: &str, value: QueryValue, operator| {
            Entry::Set(SetEntry {
                field: FieldRef::parse(field),
                value,
                operator,
            })
        };
        let statement = UpdateStatement {
            collection: collection(),
            entries: vec![
                set("name", QueryValue::Prepared, None),
                set("credits", lit(5), Some(ArithmeticOperator::Subtract)),
                set("score", lit(4), Some(ArithmeticOperator::Divide)),
                cond(ConditionKind::Equals, "id", QueryValue::Prepared),
            ],
        };
        let values = [SqlValue::Text(String::from("neo")), SqlValue::Int(1)];
        let command = update(&statement, &values).unwrap();
        assert_eq!(
            command,
            DocumentCommand::Update {
                collection: String::from("users"),
                filter: json!({ "id": { "$eq": 1 } }),
                update: json!({
                    "$set": { "name": "neo" },
                    "$inc": { "credits": -5 },
                    "$mul": { "score": 0.25 },
                }),
            }
        );
    }

    #[test]
    fn test_limit_in_delete_is_unsupported() {
        let statement = DeleteStatement {
            collection: collection(),
            entries: vec![Entry::Limit(LimitEntry { limit: 1, offset: 0 })],
        };
        assert!(matches!(
            delete(&statement, &[]),
            Err(QueryError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_insert_documents() {
        let statement = InsertStatement {
            collection: collection(),
            entries: vec![
                InsertEntry {
                    field: String::from("name"),
                    values: vec![
                        QueryValue::Literal(SqlValue::Text(String::from("a"))),
                        QueryValue::Literal(SqlValue::Text(String::from("b"))),
                    ],
                },
                InsertEntry {
                    field: String::from("age"),
                    values: vec![],
                },
            ],
        };
        let command = insert(&statement, &[SqlValue::Int(1), SqlValue::Int(2)])
            .unwrap();
        assert_eq!(
            command,
            DocumentCommand::Insert {
                collection: String::from("users"),
                documents: vec![json!({ "name": "a", "age": 1 }), json!({ "name": "b", "age": 2 })],
            }
        );
    }

    #[test]
    fn test_replace_with_filter() {
        let statement = ReplaceStatement {
            collection: collection(),
            entries: vec![
                cond(ConditionKind::Equals, "id", lit(3)),
                Entry::Set(SetEntry {
                    field: FieldRef::parse("name"),
                    value: QueryValue::Prepared,
                    operator: None,
                }),
            ],
        };
        let command = replace(&statement, &[SqlValue::Text(String::from("x"))])
            .unwrap();
        assert_eq!(
            command.to_json(),
            json!({
                "operation": "replace",
                "collection": "users",
                "filter": { "id": { "$eq": 3 } },
                "replacement": { "name": "x" },
            })
        );
    }

    #[test]
    fn test_create_indexes() {
        let statement = CreateStatement {
            collection: collection(),
            entries: vec![CreateEntry::Field(FieldEntry {
                field: String::from("email"),
                data_type: crate::entry::DataType::String,
                size: None,
                default: None,
                options: vec![FieldOption::UniqueIndex],
            })],
            engine: None,
            include: None,
        };
        let command = create(&statement).unwrap();
        assert_eq!(
            command,
            DocumentCommand::Create {
                collection: String::from("users"),
                indexes: vec![json!({ "key": { "email": 1 }, "name": "users_email_unique", "unique": true })],
            }
        );
    }

    #[test]
    fn test_lifecycle_commands() {
        let dropped = drop(&DropStatement {
            target: DropTarget::Collection(collection()),
        });
        assert_eq!(dropped.to_json(), json!({"operation": "drop", "collection": "users"}));
        let dropped = drop(&DropStatement {
            target: DropTarget::Database(String::from("shop")),
        });
        assert_eq!(dropped.collection(), None);
        assert_eq!(
            dropped.to_json(),
            json!({"operation": "drop_database", "database": "shop"})
        );
        assert_eq!(
            clear(&ClearStatement {
                collection: collection()
            }),
            DocumentCommand::Delete {
                collection: String::from("users"),
                filter: json!({}),
            }
        );
    }

    #[test]
    fn test_count_pipeline() {
        let statement = CountStatement {
            collection: collection(),
            entries: vec![cond(ConditionKind::Higher, "age", QueryValue::Prepared)],
        };
        let command = count(&statement, &[SqlValue::Int(18)]).unwrap();
        assert_eq!(
            pipeline(command),
            vec![
                json!({"$match": {"age": {"$gt": 18}}}),
                json!({"$count": "size"}),
            ]
        );
    }
}
