use std::path::PathBuf;
use std::time::Instant;

use diesel::QueryableByName;
use diesel::sql_types::{Bool, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection};

use super::{SchemaConfig, SchemaInitResult};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_SCHEMA};

/// Creates the configured schema and replays its SQL files, unless the
/// schema already exists.
///
/// Files are replayed one at a time on a single connection with the new
/// schema first on the search path; replay stops at the first failing file.
/// A failed run leaves the schema in place, partially initialized, and
/// later runs skip it.
#[tracing::instrument(
    skip_all,
    target = TRACING_TARGET_SCHEMA,
    fields(schema = %config.schema_name)
)]
pub async fn init_schema(pg: &PgClient, config: &SchemaConfig) -> PgResult<SchemaInitResult> {
    config.validate()?;

    let start = Instant::now();
    let mut conn = pg.get_connection().await?;
    let conn = conn.as_pg_connection();

    if schema_exists(conn, &config.schema_name).await? {
        tracing::info!(
            target: TRACING_TARGET_SCHEMA,
            "Schema already exists, skipping initialization"
        );
        return Ok(SchemaInitResult::existing(
            &config.schema_name,
            start.elapsed(),
        ));
    }

    let files = config.resolve_files().await?;
    tracing::info!(
        target: TRACING_TARGET_SCHEMA,
        files = files.len(),
        "Creating schema"
    );

    let schema = config.quoted_schema_name();
    conn.batch_execute(&format!("CREATE SCHEMA {schema}; SET search_path TO {schema}"))
        .await
        .map_err(|e| {
            tracing::error!(target: TRACING_TARGET_SCHEMA, error = %e, "Failed to create schema");
            PgError::from(e)
        })?;

    let replayed = replay_files(conn, files).await;

    // The connection goes back to the pool afterwards.
    if let Err(e) = conn.batch_execute("RESET search_path").await {
        tracing::warn!(target: TRACING_TARGET_SCHEMA, error = %e, "Failed to reset search_path");
    }

    let applied = replayed?;
    let duration = start.elapsed();
    tracing::info!(
        target: TRACING_TARGET_SCHEMA,
        files = applied.len(),
        duration = ?duration,
        "Schema initialized"
    );

    Ok(SchemaInitResult::created(
        &config.schema_name,
        applied,
        duration,
    ))
}

/// Returns whether a schema named `schema_name` exists.
pub async fn schema_exists(conn: &mut AsyncPgConnection, schema_name: &str) -> PgResult<bool> {
    #[derive(QueryableByName)]
    struct SchemaPresence {
        #[diesel(sql_type = Bool)]
        present: bool,
    }

    let presence: SchemaPresence = diesel::sql_query(
        "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1) AS present",
    )
    .bind::<Text, _>(schema_name)
    .get_result(conn)
    .await?;

    Ok(presence.present)
}

async fn replay_files(conn: &mut AsyncPgConnection, files: Vec<PathBuf>) -> PgResult<Vec<PathBuf>> {
    let mut applied = Vec::with_capacity(files.len());

    for path in files {
        let sql = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_SCHEMA,
                file = %path.display(),
                error = %e,
                "Failed to read schema file"
            );
            PgError::schema(&path, e)
        })?;

        let file_start = Instant::now();
        conn.batch_execute(&sql).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_SCHEMA,
                file = %path.display(),
                error = %e,
                "Schema file failed"
            );
            PgError::schema(&path, e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_SCHEMA,
            file = %path.display(),
            elapsed = ?file_start.elapsed(),
            "Schema file applied"
        );
        applied.push(path);
    }

    Ok(applied)
}
