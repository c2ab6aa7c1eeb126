//! Window state derived after each fetch.

use serde::{Deserialize, Serialize};

/// Limit and offset of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Page size.
    pub limit: i32,
    /// Number of rows skipped.
    pub offset: i32,
}

impl WindowBounds {
    /// Creates window bounds.
    #[inline]
    pub const fn new(limit: i32, offset: i32) -> Self {
        Self { limit, offset }
    }
}

/// Navigation state of the most recent fetch.
///
/// `previous_offset` is meaningful only when `has_previous` is set and
/// `next_offset` only when `has_next` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowState {
    /// Effective page size.
    pub limit: i32,
    /// Offset of the completed fetch.
    pub offset: i32,
    /// Whether rows exist before this window.
    pub has_previous: bool,
    /// Offset of the previous window.
    pub previous_offset: i32,
    /// Whether rows exist after this window.
    pub has_next: bool,
    /// Offset of the next window, or one past the last returned row.
    pub next_offset: i32,
}

impl WindowState {
    /// Derives the state of a window from the number of rows the store returned.
    ///
    /// `fetched` is the raw row count of an over-fetching query, which may be
    /// one more than `limit`.
    pub fn from_fetch(limit: i32, offset: i32, fetched: usize) -> Self {
        let limit_rows = usize::try_from(limit).unwrap_or(0);
        let has_next = fetched > limit_rows;

        let next_offset = if has_next {
            offset.saturating_add(limit)
        } else {
            // fetched <= limit here, so it fits in an i32
            offset.saturating_add(i32::try_from(fetched).unwrap_or(limit))
        };

        Self {
            limit,
            offset,
            has_previous: offset > 0,
            previous_offset: offset.saturating_sub(limit).max(0),
            has_next,
            next_offset,
        }
    }

    /// Returns the number of rows the window holds after trimming.
    #[inline]
    pub fn rows_returned(&self) -> i32 {
        self.next_offset - self.offset
    }

    /// Returns the bounds of the previous window, if any.
    #[inline]
    pub fn previous(&self) -> Option<WindowBounds> {
        self.has_previous
            .then(|| WindowBounds::new(self.limit, self.previous_offset))
    }

    /// Returns the bounds of the next window, if any.
    #[inline]
    pub fn next(&self) -> Option<WindowBounds> {
        self.has_next
            .then(|| WindowBounds::new(self.limit, self.next_offset))
    }

    /// Returns the bounds of the completed window.
    #[inline]
    pub fn current(&self) -> WindowBounds {
        WindowBounds::new(self.limit, self.offset)
    }
}
