//! The windowed query executor.

use std::fmt;

use super::{Prepare, PreparedStatement, SelectInto, WindowBounds, WindowOptions, WindowState};
use crate::args::WindowArgs;
use crate::error::{WindowError, WindowResult};

/// Executes a prepared statement one window at a time.
///
/// The executor is unbound until its first successful validation in
/// [`select`]. At that point the effective page size is fixed for the
/// lifetime of the instance: later selects reuse it even if the caller
/// changes the limit on the argument. Start a new executor to change the
/// page size.
///
/// Selects take `&mut self`, so one executor serves one paging session at a
/// time. The statement is released by [`close`] or when the executor is
/// dropped, whichever happens first.
///
/// [`select`]: WindowedQuery::select
/// [`close`]: WindowedQuery::close
pub struct WindowedQuery<S: PreparedStatement> {
    statement: S,
    options: WindowOptions,
    limit: Option<i32>,
    state: WindowState,
    closed: bool,
}

impl<S: PreparedStatement> WindowedQuery<S> {
    /// Wraps an already prepared statement with default options.
    pub fn new(statement: S) -> Self {
        Self::with_options(statement, WindowOptions::default())
    }

    /// Wraps an already prepared statement.
    pub fn with_options(statement: S, options: WindowOptions) -> Self {
        Self {
            statement,
            options,
            limit: None,
            state: WindowState::default(),
            closed: false,
        }
    }

    /// Prepares `query` with `preparer` and wraps the resulting statement.
    pub async fn prepare<P>(preparer: &P, query: &str) -> Result<Self, S::Error>
    where
        P: Prepare<Statement = S>,
    {
        let statement = preparer.prepare(query).await?;
        Ok(Self::new(statement))
    }

    /// Replaces the options.
    ///
    /// Has no effect on a limit that is already bound.
    #[must_use]
    pub fn options(mut self, options: WindowOptions) -> Self {
        self.options = options;
        self
    }

    /// Selects one window of rows into `rows`.
    ///
    /// `rows` must be empty. On success it holds at most the effective limit
    /// of rows and [`state`] describes the adjacent windows. The argument's
    /// offset is normalized in place and its limit is left at the over-fetch
    /// value `limit + 1`.
    ///
    /// Statement failures are returned as [`WindowError::Query`] and leave the
    /// previous state untouched.
    ///
    /// [`state`]: WindowedQuery::state
    pub async fn select<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<(), S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        if !rows.is_empty() {
            return Err(WindowError::InvalidContainer);
        }

        let (requested_limit, requested_offset) = args.subset();
        let limit = match self.limit {
            Some(limit) => limit,
            None => self.options.resolve_limit(requested_limit)?,
        };
        let offset = self.options.resolve_offset(requested_offset)?;
        self.limit = Some(limit);

        args.set_offset(offset);
        args.set_limit(limit + 1);

        let params = args.params();
        self.statement
            .select_into(rows, &params)
            .await
            .map_err(WindowError::Query)?;

        self.state = WindowState::from_fetch(limit, offset, rows.len());
        rows.truncate(limit as usize);

        Ok(())
    }

    /// Selects the window before the current one.
    ///
    /// Fails with [`WindowError::BeginOfResults`] without running a query
    /// when there is no previous window.
    pub async fn select_previous<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<(), S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        if !rows.is_empty() {
            return Err(WindowError::InvalidContainer);
        }
        let bounds = self.previous()?;
        args.set_offset(bounds.offset);
        self.select(rows, args).await
    }

    /// Selects the window after the current one.
    ///
    /// Fails with [`WindowError::EndOfResults`] without running a query when
    /// the last select returned the final rows.
    pub async fn select_next<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<(), S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        if !rows.is_empty() {
            return Err(WindowError::InvalidContainer);
        }
        let bounds = self.next()?;
        args.set_offset(bounds.offset);
        self.select(rows, args).await
    }

    /// Returns the bounds of the previous window.
    pub fn previous(&self) -> WindowResult<WindowBounds, S::Error> {
        self.state.previous().ok_or(WindowError::BeginOfResults)
    }

    /// Returns the bounds of the next window.
    pub fn next(&self) -> WindowResult<WindowBounds, S::Error> {
        self.state.next().ok_or(WindowError::EndOfResults)
    }

    /// Returns whether a previous window exists.
    #[inline]
    pub fn has_previous(&self) -> bool {
        self.state.has_previous
    }

    /// Returns whether a next window exists.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.state.has_next
    }

    /// Returns the state of the most recent successful select.
    #[inline]
    pub fn state(&self) -> &WindowState {
        &self.state
    }

    /// Returns the bound page size, if a select has fixed one.
    #[inline]
    pub fn limit(&self) -> Option<i32> {
        self.limit
    }

    /// Returns whether the page size has been fixed.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.limit.is_some()
    }

    /// Returns the underlying statement.
    #[inline]
    pub fn statement(&self) -> &S {
        &self.statement
    }

    /// Releases the prepared statement.
    ///
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.statement.close();
        }
    }

    /// Returns whether [`close`] has run.
    ///
    /// [`close`]: WindowedQuery::close
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<S: PreparedStatement> Drop for WindowedQuery<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: PreparedStatement> fmt::Debug for WindowedQuery<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedQuery")
            .field("options", &self.options)
            .field("limit", &self.limit)
            .field("state", &self.state)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
