//! Record repository trait for processed-image records.

use crate::db::errors::Result;
use crate::db::models::images::{ImageCreateDBRequest, ImageDBResponse};

/// Append-only store of processed-image records.
///
/// Records are created once at the end of a successful upload and never updated or
/// deleted. Implementations must tolerate concurrent independent `save_results` calls.
#[async_trait::async_trait]
pub trait ImageRepository: Send + Sync {
    /// Persist a new record. The repository assigns `id` and `uploaded_at`.
    async fn save_results(&self, request: &ImageCreateDBRequest) -> Result<ImageDBResponse>;

    /// Fetch one page of records, newest first.
    ///
    /// `page` is 1-based. Pages past the end yield an empty vector rather than an error.
    async fn get_history(&self, page: i64, per_page: i64) -> Result<Vec<ImageDBResponse>>;
}

/// Translate a 1-based page into a row offset, clamping nonsensical input.
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        // Zero and negative pages behave like the first page
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(-4, 20), 0);
        assert_eq!(page_offset(i64::MAX, 20), i64::MAX);
    }
}
