use serde::{Deserialize, Serialize};

use super::constants::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Offset pagination over the post feed.
///
/// Values are clamped rather than rejected: `limit` into `1..=100` and
/// `offset` to at least zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of rows returned.
    pub limit: i64,
    /// Number of rows skipped.
    pub offset: i64,
}

impl Pagination {
    /// Creates a pagination window, clamping both values into range.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: offset.max(0),
        }
    }

    /// Builds a window from optional request parameters.
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(
            limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset.unwrap_or_default(),
        )
    }

    /// Returns the limit as a `usize` for in-memory slicing.
    #[inline]
    pub fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or_default()
    }

    /// Returns the offset as a `usize` for in-memory slicing.
    #[inline]
    pub fn offset_usize(&self) -> usize {
        usize::try_from(self.offset).unwrap_or_default()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}
