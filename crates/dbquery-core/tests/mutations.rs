//! Tests for inserts, updates, deletes, replaces and table definitions.

mod common;
use common::*;

use dbquery_core::{
    ChangeQuery, DataType, Dialect, FieldOption, QueryError, SearchQuery, SqlValue, PREPARED,
};

// ===================================================================
// INSERT
// ===================================================================

#[test]
fn insert_groups_explicit_and_runtime_values_into_rows() {
    let query = table("t")
        .insert()
        .set("a", 1)
        .set("a", PREPARED)
        .set("b", "x")
        .fields(&["a", "b"]);
    let values = [SqlValue::Int(2), text("y"), SqlValue::Int(3), text("z")];
    let (sql_text, params) = sql(&query.compile(&values).unwrap());
    assert_eq!(sql_text, "INSERT INTO `t` (`a`,`b`) VALUES (?,?),(?,?),(?,?);");
    assert_eq!(
        params,
        vec![
            SqlValue::Int(1),
            text("x"),
            SqlValue::Int(2),
            text("y"),
            SqlValue::Int(3),
            text("z")
        ]
    );
}

#[test]
fn insert_rows_from_values_calls() {
    let query = table("t")
        .insert()
        .fields(&["a", "b"])
        .values([1, 2])
        .unwrap()
        .values([3, 4])
        .unwrap();
    let (sql_text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(sql_text, "INSERT INTO `t` (`a`,`b`) VALUES (?,?),(?,?);");
    assert_eq!(params, ints(&[1, 2, 3, 4]));
}

#[test]
fn insert_without_fields_is_rejected() {
    let query = table("t").insert();
    assert!(matches!(query.compile(&[]), Err(QueryError::EmptyInsert(_))));
}

#[test]
fn insert_overflowing_field_is_rejected() {
    let query = table("t").insert().set("a", 1).set("a", 2).set("a", 3).fields(&["b"]);
    assert!(matches!(
        query.compile(&[SqlValue::Int(9)]),
        Err(QueryError::InsertOverflow { .. })
    ));
}

// ===================================================================
// UPDATE / DELETE
// ===================================================================

#[test]
fn update_with_arithmetic() {
    let query = table("t")
        .update()
        .subtract("stock", 1)
        .multiply("price", PREPARED)
        .divide("weight", 2)
        .where_higher("stock", 0);
    let (sql_text, params) = sql(&query.compile(&[SqlValue::Float(1.1)]).unwrap());
    assert_eq!(
        sql_text,
        "UPDATE `t` SET `stock`=`stock`-?,`price`=`price`*?,`weight`=`weight`/? WHERE `stock`>?"
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Int(1),
            SqlValue::Float(1.1),
            SqlValue::Int(2),
            SqlValue::Int(0)
        ]
    );
}

#[test]
fn update_filter_declared_first_still_binds_after_assignments() {
    let query = table("t")
        .update()
        .where_eq("id", PREPARED)
        .set("name", PREPARED);
    let (_, params) = sql(&query.compile(&[SqlValue::Int(5), text("neo")]).unwrap());
    assert_eq!(params, vec![text("neo"), SqlValue::Int(5)]);
}

#[test]
fn delete_with_limit() {
    let query = table("t").delete().where_eq("a", 1).only_one().unwrap();
    let (sql_text, params) = sql(&query.compile(&[]).unwrap());
    assert_eq!(sql_text, "DELETE FROM `t`  WHERE `a`=? LIMIT ? OFFSET ?");
    assert_eq!(params, ints(&[1, 1, 0]));
}

// ===================================================================
// REPLACE
// ===================================================================

#[test]
fn replace_into_on_sqlite() {
    let (users, _) = collection_on(Dialect::sqlite(), "users");
    let query = users.replace().set("id", 1).set("name", PREPARED);
    let (sql_text, params) = sql(&query.compile(&[text("neo")]).unwrap());
    assert_eq!(sql_text, "REPLACE INTO \"users\" (\"id\",\"name\") VALUES (?,?);");
    assert_eq!(params, vec![SqlValue::Int(1), text("neo")]);
}

#[test]
fn replace_with_arithmetic_is_rejected() {
    let (users, _) = collection_on(Dialect::sqlite(), "users");
    let query = users.replace().add("visits", 1);
    assert!(matches!(
        query.compile(&[]),
        Err(QueryError::InsertArithmetic(_))
    ));
}

#[test]
fn replace_is_unsupported_on_mssql() {
    let (users, _) = collection_on(Dialect::mssql(), "users");
    let query = users.replace().set("id", 1);
    assert!(matches!(
        query.compile(&[]),
        Err(QueryError::Unsupported { .. })
    ));
}

// ===================================================================
// CREATE
// ===================================================================

#[test]
fn create_on_postgres_returns_index_statements() {
    let (users, _) = collection_on(Dialect::postgresql(), "users");
    let query = users
        .create()
        .field_with(
            "id",
            DataType::Long,
            None,
            None,
            &[FieldOption::PrimaryKey, FieldOption::AutoIncrement],
        )
        .field_with(
            "email",
            DataType::String,
            Some(128),
            None,
            &[FieldOption::NotNull, FieldOption::UniqueIndex],
        )
        .field_with("role", DataType::String, None, Some(text("member")), &[]);
    let command = query.compile(&[]).unwrap();
    let compiled = command.as_sql().unwrap();
    assert_eq!(
        compiled.sql,
        "CREATE TABLE IF NOT EXISTS \"db\".\"users\"(\"id\" BIGSERIAL PRIMARY KEY UNIQUE,\
         \"email\" VARCHAR(128) NOT NULL,\"role\" VARCHAR(255) DEFAULT 'member');"
    );
    assert!(compiled.params.is_empty());
    assert_eq!(
        compiled.additional_statements,
        vec![String::from(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"users_email_unique\" ON \"db\".\"users\"(\"email\");"
        )]
    );
}

#[test]
fn create_on_mysql_binds_defaults_and_copies_rows() {
    let (users, _) = collection_on(Dialect::mysql(), "users");
    let (legacy, _) = collection_on(Dialect::mysql(), "legacy");
    let query = users
        .create()
        .field_with("active", DataType::Boolean, None, Some(SqlValue::Bool(true)), &[])
        .engine("InnoDB")
        .include(legacy.find().where_eq("kept", PREPARED))
        .unwrap();
    let (sql_text, params) = sql(&query.compile(&[SqlValue::Bool(true)]).unwrap());
    assert_eq!(
        sql_text,
        "CREATE TABLE IF NOT EXISTS `db`.`users`(`active` BIT(1) DEFAULT ?) ENGINE=InnoDB \
         AS SELECT * FROM `db`.`legacy`  WHERE `kept`=?;"
    );
    assert_eq!(params, vec![SqlValue::Bool(true), SqlValue::Bool(true)]);
}
