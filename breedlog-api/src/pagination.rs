//! Limit/offset pagination for record listings

use serde::{Deserialize, Serialize};

/// Page size when the client does not ask for one
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page a client may request
pub const MAX_LIMIT: i64 = 100;

/// Sanitized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Clamp requested limit/offset
    ///
    /// Limit defaults to 50 and is clamped to [1, 100]; offset defaults to 0 and
    /// negatives become 0.
    ///
    /// # Examples
    /// ```
    /// use breedlog_api::pagination::PageWindow;
    ///
    /// let w = PageWindow::from_request(Some(500), Some(-3));
    /// assert_eq!(w.limit, 100);
    /// assert_eq!(w.offset, 0);
    ///
    /// let w = PageWindow::from_request(None, None);
    /// assert_eq!(w.limit, 50);
    /// ```
    pub fn from_request(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Pagination metadata returned with a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Metadata for `window` over `total` rows
pub fn calculate_pagination(total: i64, window: PageWindow) -> Pagination {
    Pagination {
        total,
        limit: window.limit,
        offset: window.offset,
        has_more: total.saturating_sub(window.offset) > window.limit,
    }
}
