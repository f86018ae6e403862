//! The upload-processing pipeline.
//!
//! ```text
//!   post_image(upload)
//!        |
//!        v
//!   UploadValidator ---- rejects ----> Error::Validation (nothing written)
//!        |
//!        v
//!   FileWriter::save(<key>_<sanitized name>)
//!        |
//!        v
//!   TaskRegistry::process  (blocking pool; task failures land in `errors`)
//!        |
//!        v
//!   ImageRepository::save_results
//!        |
//!        v
//!   UploadResponse { image, image_url, result }
//! ```
//!
//! A persistence failure after the write leaves the stored object in place; nothing is rolled
//! back.

use crate::api::models::images::{ImageHistoryItem, UploadResponse, image_url};
use crate::api::models::pagination::HistoryQuery;
use crate::db::handlers::ImageRepository;
use crate::db::models::images::ImageCreateDBRequest;
use crate::errors::{Error, Result};
use crate::storage::{FileReader, FileWriter, StoredFile};
use crate::tasks::TaskRegistry;
use crate::upload::{UploadedFile, generate_unique_name};
use crate::validation::{UploadValidator, ValidationError};
use bon::Builder;
use std::sync::Arc;
use tracing::{Span, instrument};

/// Composes validation, storage, analysis and persistence.
///
/// Every collaborator is shared and immutable, so one pipeline serves all requests.
#[derive(Clone, Builder)]
pub struct ImagePipeline {
    validator: UploadValidator,
    writer: Arc<dyn FileWriter>,
    reader: Arc<dyn FileReader>,
    tasks: Arc<TaskRegistry>,
    repository: Arc<dyn ImageRepository>,
    /// Prefix of returned `image_url`s, e.g. `http://localhost:8080/images/view`
    #[builder(into)]
    base_url: String,
}

impl ImagePipeline {
    /// Validate, store, analyse and record an upload.
    #[instrument(skip_all, fields(image_name = tracing::field::Empty), err)]
    pub async fn post_image(&self, file: Option<UploadedFile>) -> Result<UploadResponse> {
        self.validator.validate(file.as_ref())?;
        let Some(file) = file else {
            return Err(ValidationError::MissingFile.into());
        };

        let name = generate_unique_name(&file.filename);
        Span::current().record("image_name", name.as_str());

        self.writer.save(&file, &name).await?;

        let tasks = Arc::clone(&self.tasks);
        let task_file = file.clone();
        let result = tokio::task::spawn_blocking(move || tasks.process(&task_file))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("run analysis tasks: {e}"),
            })?;

        if !result.errors.is_empty() {
            tracing::info!(failed = result.errors.len(), "Some analysis tasks failed");
        }

        let record = self
            .repository
            .save_results(&ImageCreateDBRequest {
                path: name.clone(),
                result: result.to_value(),
            })
            .await?;

        tracing::info!(id = record.id, bytes = file.content.len(), "Image processed");

        Ok(UploadResponse {
            image_url: image_url(&self.base_url, &name),
            image: name,
            result,
        })
    }

    /// Fetch a stored image by the name returned from [`Self::post_image`].
    #[instrument(skip(self), err)]
    pub async fn view_image(&self, name: &str) -> Result<StoredFile> {
        Ok(self.reader.get_response(name).await?)
    }

    /// One page of upload history, newest first. Defaults to page 1 of 20.
    #[instrument(skip(self), err)]
    pub async fn get_history(&self, page: Option<i64>, count: Option<i64>) -> Result<Vec<ImageHistoryItem>> {
        let (page, count) = HistoryQuery::new(page, count).params();

        let records = self.repository.get_history(page, count).await?;

        Ok(records
            .into_iter()
            .map(|record| ImageHistoryItem::from_record(record, &self.base_url))
            .collect())
    }
}
