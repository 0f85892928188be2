//! Catalog Access - command-line entry point.
//!
//! Runs one dispatch call against the catalog database and prints the result
//! as JSON on stdout. Logs go to stderr.

use catalog_access::auth;
use catalog_access::config::{Command, Config, parse_field_map};
use catalog_access::models::{FieldMap, Row};
use catalog_access::{Database, Dispatcher};
use clap::Parser;
use serde_json::Value as JsonValue;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn rows_to_json(rows: Vec<Row>) -> JsonValue {
    JsonValue::Array(rows.into_iter().map(JsonValue::Object).collect())
}

async fn run(config: &Config) -> Result<JsonValue, Box<dyn std::error::Error>> {
    if let Command::HashPassword { password } = &config.command {
        return Ok(JsonValue::String(auth::hash_password(password)?));
    }

    let connection = config.connection_config()?;
    let db = Database::connect(&connection, config.query_timeout_duration()).await?;
    run_on(db, &config.command).await
}

/// Run one command and close the pool whatever the outcome.
async fn run_on(db: Database, command: &Command) -> Result<JsonValue, Box<dyn std::error::Error>> {
    let result = dispatch(&Dispatcher::new(db.clone()), command).await;
    db.close().await;
    if result.is_ok() {
        info!("Request complete");
    }
    result
}

async fn dispatch(
    dispatcher: &Dispatcher,
    command: &Command,
) -> Result<JsonValue, Box<dyn std::error::Error>> {
    let output = match command {
        Command::Select { entity, filter } => {
            let filter = filter.as_deref().map(parse_field_map).transpose()?;
            rows_to_json(dispatcher.select(entity, filter.as_ref()).await?)
        }
        Command::Insert { entity, fields } => {
            let fields = parse_field_map(fields)?;
            JsonValue::from(dispatcher.insert(entity, Some(&fields)).await?)
        }
        Command::Update { entity, id, fields } => {
            let fields = parse_field_map(fields)?;
            JsonValue::from(dispatcher.update(entity, Some(id.as_str()), Some(&fields)).await?)
        }
        Command::Delete { entity, filter } => {
            let filter = parse_field_map(filter)?;
            JsonValue::from(dispatcher.delete(entity, Some(&filter)).await?)
        }
        Command::Login { email, password } => {
            let mut credentials = FieldMap::new();
            credentials.insert("email".to_string(), JsonValue::String(email.clone()));
            credentials.insert("password".to_string(), JsonValue::String(password.clone()));
            let user = dispatcher.select("utilisateur", Some(&credentials)).await?;
            user.into_iter()
                .next()
                .map(JsonValue::Object)
                .unwrap_or(JsonValue::Null)
        }
        Command::HashPassword { .. } => JsonValue::Null,
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    match run(&config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Request failed");
            eprintln!("Error: {e}");
            if let Some(db_err) = e.downcast_ref::<catalog_access::DbError>() {
                if let Some(suggestion) = db_err.suggestion() {
                    eprintln!("Hint: {suggestion}");
                }
                if db_err.is_retryable() {
                    eprintln!("The failure may be transient; the request can be retried.");
                }
            }
            ExitCode::FAILURE
        }
    }
}
