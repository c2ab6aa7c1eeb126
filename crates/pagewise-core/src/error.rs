//! Error types for windowed query execution.

/// Errors produced while selecting a window of rows.
///
/// The type parameter `E` is the error type of the underlying prepared
/// statement. Statement failures are carried as-is in [`WindowError::Query`]
/// so the caller can decide retryability with full knowledge of the backend.
#[derive(Debug, thiserror::Error)]
#[must_use = "window errors should be handled appropriately"]
pub enum WindowError<E> {
    /// The row container was not usable for a fresh window.
    ///
    /// Windows are computed from the rows a single fetch appends, so the
    /// container must be empty on entry.
    #[error("Invalid container: row buffer must be empty before a select")]
    InvalidContainer,

    /// The requested limit was rejected under [`LimitPolicy::Strict`].
    ///
    /// [`LimitPolicy::Strict`]: crate::LimitPolicy::Strict
    #[error("Invalid limit: {0}")]
    InvalidLimit(i32),

    /// The requested offset was rejected under [`LimitPolicy::Strict`].
    ///
    /// [`LimitPolicy::Strict`]: crate::LimitPolicy::Strict
    #[error("Invalid offset: {0}")]
    InvalidOffset(i32),

    /// There is no window before the current one.
    #[error("Beginning of results")]
    BeginOfResults,

    /// There is no window after the current one.
    #[error("End of results")]
    EndOfResults,

    /// The underlying statement failed.
    #[error(transparent)]
    Query(E),
}

impl<E> WindowError<E> {
    /// Returns whether this error is a navigation-boundary signal.
    ///
    /// Boundary errors are expected control flow: callers that check
    /// `has_previous`/`has_next` before navigating never observe them.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::BeginOfResults | Self::EndOfResults)
    }

    /// Returns whether this error was raised before any query executed.
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidContainer | Self::InvalidLimit(_) | Self::InvalidOffset(_)
        )
    }

    /// Returns the underlying statement error, if this is one.
    pub fn into_query_error(self) -> Option<E> {
        match self {
            Self::Query(err) => Some(err),
            _ => None,
        }
    }
}

/// Specialized [`Result`] type for window operations.
pub type WindowResult<T, E> = Result<T, WindowError<E>>;
