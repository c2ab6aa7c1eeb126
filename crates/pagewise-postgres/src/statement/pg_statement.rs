use std::fmt;

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text};
use diesel_async::SimpleAsyncConnection;
use pagewise_core::{NamedParams, ParamValue, Prepare, PreparedStatement, SelectInto};

use super::NamedStatement;
use crate::{PgClient, PgConn, PgError, PgResult, TRACING_TARGET_QUERY};

/// A named-parameter query bound to one pooled connection.
///
/// The connection stays checked out of the pool from preparation until the
/// statement is closed or dropped, so every window of a walk runs on the
/// same session.
pub struct PgStatement {
    statement: NamedStatement,
    conn: Option<PgConn>,
}

impl PgStatement {
    /// Creates a statement running `statement` on `conn`.
    pub fn new(statement: NamedStatement, conn: PgConn) -> Self {
        Self {
            statement,
            conn: Some(conn),
        }
    }

    /// Returns the rewritten query text.
    #[inline]
    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    /// Returns the parsed statement.
    #[inline]
    pub fn named(&self) -> &NamedStatement {
        &self.statement
    }

    /// Returns whether the statement has released its connection.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Runs the statement with `params` and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::StatementClosed`] after [`close`], a
    /// [`PgError::MissingParameter`] for unbound placeholders, or the
    /// database error of the query.
    ///
    /// [`close`]: PreparedStatement::close
    #[tracing::instrument(skip_all, target = TRACING_TARGET_QUERY)]
    pub async fn load<T>(&mut self, params: &NamedParams) -> PgResult<Vec<T>>
    where
        T: QueryableByName<Pg> + Send + 'static,
    {
        use diesel_async::RunQueryDsl;

        let conn = self.conn.as_mut().ok_or(PgError::StatementClosed)?;
        let values = self.statement.bind(params)?;
        let query = bind_values(self.statement.sql(), &values);

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            sql = self.statement.sql(),
            parameters = values.len(),
            "Executing windowed query"
        );

        let rows: Vec<T> = query.load(conn.as_pg_connection()).await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET_QUERY, error = %e, "Windowed query failed");
            PgError::from(e)
        })?;

        tracing::debug!(target: TRACING_TARGET_QUERY, rows = rows.len(), "Windowed query completed");
        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn detached(statement: NamedStatement) -> Self {
        Self {
            statement,
            conn: None,
        }
    }
}

/// Name of the server-side statement used to check a query at preparation.
const VALIDATION_STATEMENT: &str = "pagewise_validate";

/// Returns a batch that plans `sql` on the server and drops the plan again.
///
/// Placeholders are left untyped, so the server infers their types from
/// context the way a driver-level prepare does.
fn validation_batch(sql: &str) -> String {
    let sql = sql.trim_end().trim_end_matches(';').trim_end();
    format!("PREPARE {VALIDATION_STATEMENT} AS {sql}; DEALLOCATE {VALIDATION_STATEMENT}")
}

/// Binds positional values to `sql` with the SQL type matching each variant.
///
/// [`ParamValue::Null`] is sent as a text-typed null. Comparing it against a
/// column of another type needs an explicit cast in the query, such as
/// `:parent::bigint`.
fn bind_values(sql: &str, values: &[&ParamValue]) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let query: BoxedSqlQuery<'static, Pg, SqlQuery> = diesel::sql_query(sql).into_boxed();
    values.iter().fold(query, |query, value| match value {
        ParamValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        ParamValue::Bool(value) => query.bind::<Bool, _>(*value),
        ParamValue::Int(value) => query.bind::<BigInt, _>(*value),
        ParamValue::Float(value) => query.bind::<Double, _>(*value),
        ParamValue::Text(value) => query.bind::<Text, _>(value.clone()),
    })
}

impl PreparedStatement for PgStatement {
    type Error = PgError;

    fn close(&mut self) {
        if self.conn.take().is_some() {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                sql = self.statement.sql(),
                "Statement closed, connection returned to pool"
            );
        }
    }
}

impl<T> SelectInto<T> for PgStatement
where
    T: QueryableByName<Pg> + Send + 'static,
{
    async fn select_into(&mut self, rows: &mut Vec<T>, params: &NamedParams) -> PgResult<()> {
        rows.extend(self.load::<T>(params).await?);
        Ok(())
    }
}

impl Prepare for PgClient {
    type Statement = PgStatement;

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    async fn prepare(&self, query: &str) -> PgResult<PgStatement> {
        let statement = NamedStatement::parse(query);
        let mut conn = self.get_connection().await?;

        // Dropping `conn` on failure hands it back to the pool.
        conn.as_pg_connection()
            .batch_execute(&validation_batch(statement.sql()))
            .await
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_QUERY,
                    sql = statement.sql(),
                    error = %e,
                    "Statement rejected by server"
                );
                PgError::from(e)
            })?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            sql = statement.sql(),
            parameters = ?statement.names(),
            "Statement prepared"
        );

        Ok(PgStatement::new(statement, conn))
    }
}

impl fmt::Debug for PgStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgStatement")
            .field("sql", &self.statement.sql())
            .field("parameters", &self.statement.names())
            .field("closed", &self.is_closed())
            .finish()
    }
}
