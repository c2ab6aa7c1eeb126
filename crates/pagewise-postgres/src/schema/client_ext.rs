//! Extension trait adding schema initialization to [`PgClient`].

use super::{SchemaConfig, SchemaInitResult, init_schema, schema_exists};
use crate::{PgClient, PgResult};

/// Schema initialization for [`PgClient`].
pub trait PgClientSchemaExt {
    /// Creates the configured schema and replays its SQL files.
    ///
    /// Does nothing when the schema already exists; see [`init_schema`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the SQL files
    /// cannot be found or read, or any statement fails.
    fn init_schema(
        &self,
        config: &SchemaConfig,
    ) -> impl Future<Output = PgResult<SchemaInitResult>> + Send;

    /// Returns whether a schema with the given name exists.
    fn schema_exists(&self, schema_name: &str) -> impl Future<Output = PgResult<bool>> + Send;
}

impl PgClientSchemaExt for PgClient {
    async fn init_schema(&self, config: &SchemaConfig) -> PgResult<SchemaInitResult> {
        init_schema(self, config).await
    }

    async fn schema_exists(&self, schema_name: &str) -> PgResult<bool> {
        let mut conn = self.get_connection().await?;
        schema_exists(conn.as_pg_connection(), schema_name).await
    }
}
