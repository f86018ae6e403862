//! Page-based pagination for the upload history.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// First page, used when `page` is not given.
pub const DEFAULT_PAGE: i64 = 1;

/// Number of records per page, used when `count` is not given.
pub const DEFAULT_COUNT: i64 = 20;

/// Query parameters of the history endpoint.
///
/// Pages are 1-based. Both values are clamped to at least 1; a page past the end of the
/// history yields an empty list rather than an error.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Page number (default: 1)
    #[param(default = 1, minimum = 1)]
    pub page: Option<i64>,

    /// Records per page (default: 20)
    #[param(default = 20, minimum = 1)]
    pub count: Option<i64>,
}

impl HistoryQuery {
    pub fn new(page: Option<i64>, count: Option<i64>) -> Self {
        Self { page, count }
    }

    /// Get the page, defaulting to DEFAULT_PAGE and never below 1.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Get the page size, defaulting to DEFAULT_COUNT and never below 1.
    #[inline]
    pub fn count(&self) -> i64 {
        self.count.unwrap_or(DEFAULT_COUNT).max(1)
    }

    /// Get both page and count as a tuple, useful for destructuring.
    #[inline]
    pub fn params(&self) -> (i64, i64) {
        (self.page(), self.count())
    }
}
