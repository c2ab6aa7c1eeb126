//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── postgres: PgConfig           # Connection URL and pool settings
//! └── command
//!     ├── init-schema: SchemaConfig  # Schema name and SQL files
//!     └── page: PageArgs             # Query, window and link settings
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! pagewise --postgres-url "postgresql://..." init-schema --schema-name app --schema-dir sql
//!
//! POSTGRES_URL="postgresql://..." pagewise page \
//!     --query "SELECT * FROM app.items WHERE status = :status ORDER BY id LIMIT :limit OFFSET :offset" \
//!     --endpoint https://api.example.com/items --limit 20 --filter status=open
//! ```

mod filter;

use std::process;

use clap::{Args, Parser, Subcommand};
use pagewise_core::{LimitPolicy, ListParams, ParamKeys, WindowOptions};
use pagewise_postgres::{PgConfig, SchemaConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

pub use self::filter::{Filter, to_params};
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagewise")]
#[command(about = "Windowed PostgreSQL queries with navigation links")]
#[command(version)]
pub struct Cli {
    /// PostgreSQL connection and pool configuration.
    #[clap(flatten)]
    pub postgres: PgConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a schema and replay its SQL files, unless it already exists.
    InitSchema(SchemaConfig),

    /// Run a query one window at a time and print each page as JSON.
    Page(PageArgs),
}

/// Arguments of the `page` command.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Query with `:name` placeholders, including the limit and offset placeholders
    #[arg(long, env = "PAGEWISE_QUERY")]
    pub query: String,

    /// Absolute URL the navigation links point at
    #[arg(long, env = "PAGEWISE_ENDPOINT")]
    pub endpoint: Url,

    /// Requested window size (defaults to the default limit)
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i32>,

    /// Rows to skip before the first window
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i32,

    /// Named query argument as `key=value`; may be repeated
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<Filter>,

    /// Window size used when none is requested
    #[arg(long, env = "PAGEWISE_DEFAULT_LIMIT", default_value_t = pagewise_core::DEFAULT_LIMIT)]
    pub default_limit: i32,

    /// Largest accepted window size (optional)
    #[arg(long, env = "PAGEWISE_MAX_LIMIT")]
    pub max_limit: Option<i32>,

    /// Reject invalid limits and offsets instead of coercing them
    #[arg(long)]
    pub strict: bool,

    /// Use `l` and `o` instead of `limit` and `offset` as parameter names
    #[arg(long)]
    pub short_keys: bool,

    /// Number of consecutive windows to print
    #[arg(long, default_value = "1")]
    pub pages: usize,
}

impl PageArgs {
    /// Returns the executor options.
    pub fn window_options(&self) -> WindowOptions {
        let mut options = WindowOptions::new(self.default_limit);
        if let Some(max_limit) = self.max_limit {
            options = options.with_max_limit(max_limit);
        }
        if self.strict {
            options = options.with_policy(LimitPolicy::Strict);
        }
        options
    }

    /// Returns the parameter names of the limit and offset.
    pub fn keys(&self) -> ParamKeys {
        if self.short_keys {
            ParamKeys::short()
        } else {
            ParamKeys::default()
        }
    }

    /// Returns the window arguments of the first page.
    pub fn list_params(&self) -> ListParams {
        ListParams {
            limit: self.limit,
            offset: self.offset,
            keys: self.keys(),
        }
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so that stdout carries only the JSON output.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_url = %self.postgres.database_url_masked(),
            postgres_max_connections = self.postgres.postgres_max_connections,
            postgres_connection_timeout_secs = ?self.postgres.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?self.postgres.postgres_idle_timeout_secs,
            postgres_max_lifetime_secs = ?self.postgres.postgres_max_lifetime_secs,
            "Database configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pagewise_core::ParamValue;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn parse_page(extra: &[&str]) -> PageArgs {
        let mut args = vec![
            "pagewise",
            "--postgres-url",
            "postgresql://localhost/db",
            "page",
            "--query",
            "SELECT * FROM items LIMIT :limit OFFSET :offset",
            "--endpoint",
            "https://host/items",
        ];
        args.extend_from_slice(extra);

        match Cli::try_parse_from(args).unwrap().command {
            Command::Page(page) => page,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_defaults() {
        let page = parse_page(&[]);
        assert_eq!(page.limit, None);
        assert_eq!(page.offset, 0);
        assert_eq!(page.pages, 1);
        assert_eq!(page.keys(), ParamKeys::default());
        assert_eq!(page.window_options(), WindowOptions::default());
        assert_eq!(page.list_params(), ListParams::default());
    }

    #[test]
    fn page_options() {
        let page = parse_page(&[
            "--limit",
            "4",
            "--offset",
            "-2",
            "--max-limit",
            "100",
            "--strict",
            "--short-keys",
            "--filter",
            "status=open",
            "--filter",
            "owner=7",
        ]);

        assert_eq!(page.limit, Some(4));
        assert_eq!(page.offset, -2);
        assert_eq!(page.keys(), ParamKeys::short());
        assert_eq!(
            page.window_options(),
            WindowOptions::default()
                .with_max_limit(100)
                .with_policy(LimitPolicy::Strict)
        );

        let filters = to_params(&page.filters);
        assert_eq!(filters.get("status"), Some(&ParamValue::Text("open".into())));
        assert_eq!(filters.get("owner"), Some(&ParamValue::Int(7)));
    }

    #[test]
    fn malformed_filter_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "pagewise",
            "--postgres-url",
            "postgresql://localhost/db",
            "page",
            "--query",
            "SELECT 1",
            "--endpoint",
            "https://host/items",
            "--filter",
            "status",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn init_schema_with_explicit_files() {
        let cli = Cli::try_parse_from([
            "pagewise",
            "--postgres-url",
            "postgresql://localhost/db",
            "init-schema",
            "--schema-name",
            "app",
            "--schema-file",
            "02_tables.sql,03_views.sql",
        ])
        .unwrap();

        let Command::InitSchema(schema) = cli.command else {
            panic!("expected init-schema");
        };
        assert_eq!(schema.schema_name, "app");
        assert_eq!(schema.schema_dir, std::path::PathBuf::from("sql"));
        assert_eq!(schema.schema_files.len(), 2);
    }
}
