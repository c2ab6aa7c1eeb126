//! Capabilities the windowed executor consumes from a database backend.

use std::future::Future;

use crate::args::NamedParams;

/// Prepares named-parameter statements.
///
/// Implemented by connection-owning types such as a pooled database client.
pub trait Prepare {
    /// Statement handle produced by [`Prepare::prepare`].
    type Statement: PreparedStatement;

    /// Prepares `query` for repeated execution.
    fn prepare(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Self::Statement, <Self::Statement as PreparedStatement>::Error>>
    + Send;
}

/// A prepared statement handle.
pub trait PreparedStatement {
    /// Error returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Releases the statement and any resource it pins.
    ///
    /// Must be idempotent: the executor calls it from both
    /// [`WindowedQuery::close`] and its destructor.
    ///
    /// [`WindowedQuery::close`]: crate::WindowedQuery::close
    fn close(&mut self);
}

/// Executes a prepared statement, appending rows of type `T`.
pub trait SelectInto<T>: PreparedStatement {
    /// Runs the statement with `params` and appends every returned row to `rows`.
    fn select_into(
        &mut self,
        rows: &mut Vec<T>,
        params: &NamedParams,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
