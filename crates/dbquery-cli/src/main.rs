//! dbquery CLI
//!
//! Compiles statement scripts for any registered dialect and runs them
//! against SQLite.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dbquery_cli::{language, script, SqliteExecutor, DOCUMENT_LANGUAGE};
use dbquery_core::{Command, Dialect, DialectRegistry, Driver, ExecutionMode, QueryResult};

/// Database-agnostic query compiler.
#[derive(Parser)]
#[command(name = "dbquery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dialect used by `compile`, or `document` for the document store.
    #[arg(long, env = "DBQUERY_DIALECT", default_value = "SQLite")]
    dialect: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered dialects.
    Dialects,

    /// Print the compiled form of every step in a script.
    Compile {
        /// Script file.
        file: PathBuf,
    },

    /// Run every step of a script against an SQLite database.
    Run {
        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
        database: String,

        /// Run the whole script in one transaction.
        #[arg(short, long)]
        transaction: bool,

        /// Script file.
        file: PathBuf,
    },
}

fn print_command(command: &Command) {
    match command {
        Command::Sql(query) => {
            println!("{}", query.sql);
            if !query.params.is_empty() {
                println!(
                    "  -- params: {}",
                    serde_json::to_string(&query.params).unwrap_or_default()
                );
            }
            for statement in &query.additional_statements {
                println!("{statement}");
            }
        }
        Command::Document(document) => println!("{}", document.to_json()),
    }
}

fn print_result(mode: &ExecutionMode, result: &QueryResult) -> anyhow::Result<()> {
    if *mode == ExecutionMode::Query {
        for row in &result.rows {
            println!("{}", serde_json::to_string(row)?);
        }
    } else {
        println!("{} row(s) affected", result.affected);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = DialectRegistry::with_defaults();

    match cli.command {
        Commands::Dialects => {
            for dialect in registry.iter() {
                let (open, close) = dialect.identifier_quotes();
                let environment = format!("{:?}", dialect.environment());
                println!(
                    "{:<12} {environment:<8} {open}{close}  {}",
                    dialect.name(),
                    dialect.protocol()
                );
            }
            println!("{DOCUMENT_LANGUAGE}");
        }

        Commands::Compile { file } => {
            let language = language(&registry, &cli.dialect)?;
            for step in script::load(&file)? {
                print_command(&language.compile(&step.statement, &step.values)?);
            }
        }

        Commands::Run {
            database,
            transaction,
            file,
        } => {
            let steps = script::load(&file)?;
            let executor = SqliteExecutor::connect(&database).await?;
            let driver = Driver::sql("sqlite", Arc::new(Dialect::sqlite()), Arc::new(executor));
            info!("Running {} step(s) against {database}", steps.len());
            if transaction {
                let mut group = driver.database("main").group();
                let mut modes = Vec::with_capacity(steps.len());
                for step in steps {
                    modes.push(ExecutionMode::for_statement(&step.statement));
                    group.push(step.statement, step.values);
                }
                let results = group.execute_async().await?;
                for (mode, result) in modes.iter().zip(&results) {
                    print_result(mode, result)?;
                }
            } else {
                for step in steps {
                    let mode = ExecutionMode::for_statement(&step.statement);
                    let result = Arc::clone(&driver)
                        .run_async(step.statement, step.values, mode.clone())
                        .await?;
                    print_result(&mode, &result)?;
                }
            }
        }
    }

    Ok(())
}
