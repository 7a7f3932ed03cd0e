//! Tests for compiled search queries.

mod common;
use common::*;

use dbquery_core::{
    count, max, sum, Dialect, FieldRef, JoinType, QueryError, SearchOrder, SearchQuery, SqlValue,
    PREPARED,
};

// ===================================================================
// Scenarios
// ===================================================================

#[test]
fn nested_and_group_with_limit() {
    let query = table("t")
        .find()
        .where_eq("age", 18)
        .and(|q| q.where_higher("score", 50).where_lower("score", 100))
        .unwrap()
        .limit(10, 0)
        .unwrap();
    let (text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(
        text,
        "SELECT * FROM `t`  WHERE `age`=? AND (`score`>? AND `score`<?) LIMIT ? OFFSET ?"
    );
    assert_eq!(params, ints(&[18, 50, 100, 10, 0]));
}

#[test]
fn duplicate_limit_is_rejected_before_compiling() {
    let result = table("t").find().limit(5, 0).unwrap().limit(10, 0);
    assert!(matches!(result, Err(QueryError::DuplicateLimit)));
}

#[test]
fn limit_inside_group_counts_as_duplicate() {
    let result = table("t")
        .find()
        .and_query(table("t").find().only_one().unwrap())
        .unwrap()
        .limit_to(10);
    assert!(matches!(result, Err(QueryError::DuplicateLimit)));
}

#[test]
fn group_with_limit_after_limit_is_rejected() {
    let result = table("t")
        .find()
        .limit_to(10)
        .unwrap()
        .and_query(table("t").find().only_one().unwrap());
    assert!(matches!(result, Err(QueryError::DuplicateLimit)));

    let result = table("t")
        .find()
        .only_one()
        .unwrap()
        .or(|q| q.where_eq("a", 1).limit_to(3));
    assert!(matches!(result, Err(QueryError::DuplicateLimit)));
}

#[test]
fn single_limit_inside_group_is_accepted() {
    let query = table("t")
        .find()
        .where_eq("a", 1)
        .and(|q| q.where_eq("b", 2).limit_to(3))
        .unwrap();
    let (text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(text, "SELECT * FROM `t`  WHERE `a`=? AND (`b`=?) LIMIT ? OFFSET ?");
    assert_eq!(params, ints(&[1, 2, 3, 0]));
}

// ===================================================================
// Properties
// ===================================================================

#[test]
fn placeholders_follow_runtime_values() {
    let query = table("t")
        .find()
        .where_eq("a", PREPARED)
        .or(|q| q.where_like("b", PREPARED).where_in_prepared("c"))
        .unwrap()
        .where_between("d", PREPARED, 9);
    let values = vec![
        text("x"),
        text("y%"),
        SqlValue::list([1, 2, 3]),
        SqlValue::Int(4),
    ];
    let command = query.compile(&values).unwrap();
    let compiled = command.as_sql().unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT * FROM `t`  WHERE `a`=? AND (`b` LIKE ? OR `c` IN (?,?,?)) AND `d` BETWEEN ? AND ?"
    );
    assert_eq!(compiled.placeholder_count(), compiled.params.len());
    assert_eq!(
        compiled.params,
        vec![
            text("x"),
            text("y%"),
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4),
            SqlValue::Int(9)
        ]
    );
}

#[test]
fn compiling_twice_is_identical() {
    let query = table("t")
        .find()
        .where_eq("a", PREPARED)
        .not(|q| q.where_null("b"))
        .unwrap()
        .page(2, 25)
        .unwrap();
    let values = [text("v")];
    assert_eq!(query.compile(&values).unwrap(), query.compile(&values).unwrap());
}

#[test]
fn clauses_keep_fixed_order() {
    let orders = table("orders");
    let query = table("t")
        .find()
        .limit(5, 10)
        .unwrap()
        .order_by("name", SearchOrder::Asc)
        .group_by("name")
        .where_eq("active", true)
        .join(&orders, JoinType::Inner)
        .on("id", "t_id")
        .unwrap();
    let (text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(
        text,
        "SELECT * FROM `t` INNER JOIN `orders` ON `t`.`id`=`orders`.`t_id` WHERE `active`=? \
         GROUP BY `name` ORDER BY `name` ASC LIMIT ? OFFSET ?"
    );
    assert_eq!(params, vec![SqlValue::Bool(true), SqlValue::Int(5), SqlValue::Int(10)]);
}

#[test]
fn negated_group_is_bracketed() {
    let query = table("t")
        .find()
        .where_eq("p", 0)
        .not(|q| q.and(|q| q.where_eq("a", 1).where_eq("b", 2)))
        .unwrap();
    let (text, _) = sql(&query.compile(&[]).unwrap());
    assert_eq!(text, "SELECT * FROM `t`  WHERE `p`=? AND NOT (`a`=? AND `b`=?)");
}

#[test]
fn double_negation_cancels() {
    let query = table("t").find().not(|q| q.where_not("a", 1)).unwrap();
    let (text, _) = sql(&query.compile(&[]).unwrap());
    assert_eq!(text, "SELECT * FROM `t`  WHERE `a`=?");
}

#[test]
fn empty_groups_render_nothing() {
    let query = table("t")
        .find()
        .and(|q| q)
        .unwrap()
        .where_eq("a", 1)
        .or(|q| q)
        .unwrap();
    let (text, _) = sql(&query.compile(&[]).unwrap());
    assert_eq!(text, "SELECT * FROM `t`  WHERE `a`=?");
}

#[test]
fn field_references_parse_right_anchored() {
    assert_eq!(
        FieldRef::parse("db.coll.field"),
        FieldRef {
            database: Some(String::from("db")),
            collection: Some(String::from("coll")),
            field: String::from("field"),
        }
    );
    assert_eq!(FieldRef::parse("coll.field").database, None);
    assert_eq!(FieldRef::parse("field"), FieldRef::plain("field"));

    let query = table("t").find().where_eq("db.coll.field", 1);
    let (text, _) = sql(&query.compile(&[]).unwrap());
    assert_eq!(text, "SELECT * FROM `t`  WHERE `db`.`coll`.`field`=?");
}

#[test]
fn every_predicate_accepts_aggregated_fields() {
    let query = table("t")
        .find()
        .group_by("city")
        .where_between(sum("x"), 1, PREPARED)
        .where_null(max("closed"))
        .where_not_null(count("opened"))
        .where_in(count("id"), [1, 2])
        .where_empty(max("name"));
    let (sql_text, params) = sql(&query.compile(&[SqlValue::Int(5)]).unwrap());
    assert_eq!(
        sql_text,
        "SELECT * FROM `t`  WHERE SUM(`x`) BETWEEN ? AND ? AND MAX(`closed`) IS NULL \
         AND COUNT(`opened`) IS NOT NULL AND COUNT(`id`) IN (?,?) AND MAX(`name`)=? GROUP BY `city`"
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Int(1),
            SqlValue::Int(5),
            SqlValue::Int(1),
            SqlValue::Int(2),
            text("")
        ]
    );
}

// ===================================================================
// Errors
// ===================================================================

#[test]
fn missing_runtime_value() {
    let query = table("t").find().where_eq("a", PREPARED).where_eq("b", PREPARED);
    assert!(matches!(
        query.compile(&[SqlValue::Int(1)]),
        Err(QueryError::MissingPreparedValue(1))
    ));
}

#[test]
fn empty_in_list() {
    let query = table("t").find().where_in("a", Vec::<i64>::new());
    assert!(matches!(query.compile(&[]), Err(QueryError::EmptyInList(_))));
}

#[test]
fn full_join_is_unsupported_on_mysql() {
    let (users, _) = collection_on(Dialect::mysql(), "users");
    let query = users.find().join(&users, JoinType::Full);
    assert!(matches!(
        query.compile(&[]),
        Err(QueryError::Unsupported { .. })
    ));
}

// ===================================================================
// Dialects
// ===================================================================

#[test]
fn remote_dialects_qualify_tables() {
    let (users, _) = collection_on(Dialect::postgresql(), "users");
    let (text, _) = sql(&users.find().get("name").compile(&[]).unwrap());
    assert_eq!(text, "SELECT \"name\" FROM \"db\".\"users\" ");
}

#[test]
fn mssql_pages_with_offset_fetch() {
    let (users, _) = collection_on(Dialect::mssql(), "users");
    let query = users.find().get_as(count("id"), "n").page(3, 20).unwrap();
    let (text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(
        text,
        "SELECT COUNT([id]) AS [n] FROM [db].[users]  ORDER BY (SELECT NULL) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
    );
    assert_eq!(params, ints(&[40, 20]));
}
