//! In-memory record repository.
//!
//! Stores records in a vector behind an async lock. Suitable for development and tests;
//! records are lost on restart.

use crate::db::{
    errors::Result,
    handlers::repository::{ImageRepository, page_offset},
    models::images::{ImageCreateDBRequest, ImageDBResponse},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryImageRepository {
    records: Arc<RwLock<Vec<ImageDBResponse>>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record with an explicit upload time
    #[cfg(test)]
    pub async fn insert(&self, record: ImageDBResponse) {
        self.records.write().await.push(record);
    }
}

#[async_trait::async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn save_results(&self, request: &ImageCreateDBRequest) -> Result<ImageDBResponse> {
        let mut records = self.records.write().await;

        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = ImageDBResponse {
            id,
            path: request.path.clone(),
            result: Some(request.result.clone()),
            uploaded_at: Utc::now(),
        };
        records.push(record.clone());

        Ok(record)
    }

    async fn get_history(&self, page: i64, per_page: i64) -> Result<Vec<ImageDBResponse>> {
        let records = self.records.read().await;

        let mut ordered: Vec<&ImageDBResponse> = records.iter().collect();
        ordered.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));

        let offset = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
        let limit = usize::try_from(per_page.max(1)).unwrap_or(usize::MAX);

        Ok(ordered.into_iter().skip(offset).take(limit).cloned().collect())
    }
}
