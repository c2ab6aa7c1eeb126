//! Schema initialization by SQL file replay.
//!
//! A schema is created at most once: when it already exists nothing is
//! replayed, so initialization is safe to run on every start.

mod client_ext;
mod run_schema;
mod schema_config;
mod schema_result;

pub use client_ext::PgClientSchemaExt;
pub use run_schema::{init_schema, schema_exists};
pub use schema_config::{SchemaConfig, collect_sql_files};
pub use schema_result::SchemaInitResult;
