#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;

use std::process;

use anyhow::Context;
use pagewise_postgres::PgClient;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "pagewise_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "pagewise_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "pagewise_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "pagewise_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    cli.postgres
        .validate()
        .context("invalid database configuration")?;

    let client = PgClient::new_with_test(cli.postgres.clone())
        .await
        .context("failed to connect to database")?;

    match &cli.command {
        Command::InitSchema(schema) => commands::init_schema(&client, schema).await,
        Command::Page(page) => commands::page(&client, page).await,
    }
}
