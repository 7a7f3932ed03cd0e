//! Script loading and dialect resolution.

use std::io::Write;
use std::sync::Arc;

use dbquery_cli::{language, script, CliError, Step, DOCUMENT_LANGUAGE};
use dbquery_core::{
    Command, DialectRegistry, Driver, Executor, ExecutionMode, QueryLanguage, QueryResult,
    SearchQuery, SqlValue, Statement, PREPARED,
};

struct Offline;

impl Executor for Offline {
    fn execute(
        &self,
        _command: &Command,
        _mode: &ExecutionMode,
    ) -> Result<QueryResult, dbquery_core::BoxError> {
        Ok(QueryResult::default())
    }
}

fn find_step() -> Step {
    let driver = Driver::sql(
        "offline",
        DialectRegistry::with_defaults().get("MySQL").unwrap(),
        Arc::new(Offline),
    );
    let statement = driver
        .database("shop")
        .collection("users")
        .find()
        .where_eq("name", PREPARED)
        .into_statement();
    Step {
        statement: Statement::from(statement),
        values: vec![SqlValue::Text(String::from("alice"))],
    }
}

#[test]
fn load_reads_steps_from_file() {
    let steps = vec![find_step()];
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&steps).unwrap().as_bytes())
        .unwrap();

    let loaded = script::load(file.path()).unwrap();
    assert_eq!(loaded, steps);
}

#[test]
fn values_default_to_empty() {
    let json = r#"[{
        "statement": {
            "kind": "delete",
            "collection": { "database": "shop", "name": "users" }
        }
    }]"#;
    let steps = script::parse(std::path::Path::new("inline.json"), json).unwrap();
    assert_eq!(steps.len(), 1);
    assert!(steps[0].values.is_empty());
}

#[test]
fn malformed_script_names_its_path() {
    let error = script::parse(std::path::Path::new("broken.json"), "[{").unwrap_err();
    assert!(matches!(error, CliError::Script { .. }));
    assert!(error.to_string().contains("broken.json"));
}

#[test]
fn language_resolves_dialects_and_document_store() {
    let registry = DialectRegistry::with_defaults();
    let step = find_step();

    let mysql = language(&registry, "MySQL").unwrap();
    let command = mysql.compile(&step.statement, &step.values).unwrap();
    let query = command.as_sql().unwrap();
    assert_eq!(query.sql, "SELECT * FROM `shop`.`users`  WHERE `name`=?");
    assert_eq!(query.params, step.values);

    let document = language(&registry, DOCUMENT_LANGUAGE).unwrap();
    assert!(matches!(document, QueryLanguage::Document));
    let command = document.compile(&step.statement, &step.values).unwrap();
    assert!(matches!(command, Command::Document(_)));

    let error = language(&registry, "Oracle").unwrap_err();
    assert!(matches!(error, CliError::UnknownDialect(name) if name == "Oracle"));
}
