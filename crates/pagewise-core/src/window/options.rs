//! Limit and offset normalization.

use serde::{Deserialize, Serialize};

use crate::error::{WindowError, WindowResult};

/// Page size applied when the caller does not supply a usable limit.
pub const DEFAULT_LIMIT: i32 = 64;

/// Largest page size an executor accepts.
///
/// One below `i32::MAX` so that the over-fetch limit still fits.
pub const MAX_LIMIT: i32 = i32::MAX - 1;

/// How an executor treats out-of-range limits and offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Replace a limit below 1 with the default, cap it at the maximum, and
    /// clamp a negative offset to zero.
    #[default]
    Coerce,
    /// Reject a limit below 1 or above the maximum with
    /// [`WindowError::InvalidLimit`] and a negative offset with
    /// [`WindowError::InvalidOffset`].
    Strict,
}

/// Options controlling how a windowed executor sizes its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOptions {
    /// Page size used when the caller's limit is absent (or invalid, when coercing).
    pub default_limit: i32,
    /// Upper bound on the page size.
    pub max_limit: Option<i32>,
    /// Treatment of invalid values.
    pub policy: LimitPolicy,
}

impl WindowOptions {
    /// Creates options with the given default limit.
    ///
    /// The default is clamped into `1..=MAX_LIMIT`.
    pub fn new(default_limit: i32) -> Self {
        Self {
            default_limit: default_limit.clamp(1, MAX_LIMIT),
            ..Self::default()
        }
    }

    /// Sets the maximum page size.
    #[must_use]
    pub fn with_max_limit(mut self, max_limit: i32) -> Self {
        self.max_limit = Some(max_limit.clamp(1, MAX_LIMIT));
        self
    }

    /// Sets the limit policy.
    #[must_use]
    pub fn with_policy(mut self, policy: LimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rejects invalid values instead of coercing them.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_policy(LimitPolicy::Strict)
    }

    /// Returns the effective maximum page size.
    #[inline]
    pub fn upper_limit(&self) -> i32 {
        self.max_limit.unwrap_or(MAX_LIMIT)
    }

    /// Resolves the caller's requested limit into the effective limit.
    pub fn resolve_limit<E>(&self, requested: Option<i32>) -> WindowResult<i32, E> {
        let upper = self.upper_limit();
        let default = self.default_limit.min(upper);

        match (requested, self.policy) {
            (None, _) => Ok(default),
            (Some(limit), LimitPolicy::Coerce) if limit < 1 => Ok(default),
            (Some(limit), LimitPolicy::Coerce) => Ok(limit.min(upper)),
            (Some(limit), LimitPolicy::Strict) if limit < 1 || limit > upper => {
                Err(WindowError::InvalidLimit(limit))
            }
            (Some(limit), LimitPolicy::Strict) => Ok(limit),
        }
    }

    /// Resolves the caller's requested offset into the effective offset.
    pub fn resolve_offset<E>(&self, requested: i32) -> WindowResult<i32, E> {
        match self.policy {
            LimitPolicy::Strict if requested < 0 => Err(WindowError::InvalidOffset(requested)),
            _ => Ok(requested.max(0)),
        }
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            policy: LimitPolicy::Coerce,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    type Result<T> = WindowResult<T, io::Error>;

    #[test]
    fn coerce_replaces_unusable_limits_with_default() {
        let options = WindowOptions::default();
        let resolve = |limit| options.resolve_limit::<io::Error>(limit).ok();
        assert_eq!(resolve(None), Some(DEFAULT_LIMIT));
        assert_eq!(resolve(Some(0)), Some(DEFAULT_LIMIT));
        assert_eq!(resolve(Some(-3)), Some(DEFAULT_LIMIT));
        let limit: Result<i32> = options.resolve_limit(Some(25));
        assert_eq!(limit.ok(), Some(25));
    }

    #[test]
    fn coerce_caps_at_max_limit() {
        let options = WindowOptions::new(10).with_max_limit(100);
        let limit: Result<i32> = options.resolve_limit(Some(500));
        assert_eq!(limit.ok(), Some(100));
    }

    #[test]
    fn coerce_clamps_negative_offset() {
        let offset: Result<i32> = WindowOptions::default().resolve_offset(-5);
        assert_eq!(offset.ok(), Some(0));
    }

    #[test]
    fn default_never_exceeds_max() {
        let options = WindowOptions::new(500).with_max_limit(50);
        let limit: Result<i32> = options.resolve_limit(None);
        assert_eq!(limit.ok(), Some(50));
    }

    #[test]
    fn strict_rejects_invalid_values() {
        let options = WindowOptions::default().with_max_limit(100).strict();

        let zero: Result<i32> = options.resolve_limit(Some(0));
        assert!(matches!(zero, Err(WindowError::InvalidLimit(0))));

        let huge: Result<i32> = options.resolve_limit(Some(101));
        assert!(matches!(huge, Err(WindowError::InvalidLimit(101))));

        let negative: Result<i32> = options.resolve_offset(-1);
        assert!(matches!(negative, Err(WindowError::InvalidOffset(-1))));
    }

    #[test]
    fn strict_accepts_absent_limit() {
        let limit: Result<i32> = WindowOptions::default().strict().resolve_limit(None);
        assert_eq!(limit.ok(), Some(DEFAULT_LIMIT));
    }

    #[test]
    fn new_clamps_default_limit() {
        assert_eq!(WindowOptions::new(0).default_limit, 1);
        assert_eq!(WindowOptions::new(i32::MAX).default_limit, MAX_LIMIT);
    }
}
