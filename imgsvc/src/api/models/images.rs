//! API request/response models for image uploads.

use crate::db::models::images::ImageDBResponse;
use crate::tasks::TaskResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Envelope returned after a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Name the image is stored under
    #[schema(example = "aZ3k9_holiday.png")]
    pub image: String,
    /// Where the stored image can be fetched
    pub image_url: String,
    /// Task name to value for every successful task, plus an `errors` map of failed tasks
    #[schema(value_type = Object, example = json!({"Average Pixel Value": 0.6375, "errors": {}}))]
    pub result: TaskResult,
}

/// One entry of the upload history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageHistoryItem {
    pub image_name: String,
    pub image_url: String,
    /// Task results recorded at upload time
    #[schema(value_type = Option<Object>)]
    pub results: Option<Value>,
    pub uploaded_at: DateTime<Utc>,
}

impl ImageHistoryItem {
    pub fn from_record(record: ImageDBResponse, base_url: &str) -> Self {
        Self {
            image_url: image_url(base_url, &record.path),
            image_name: record.path,
            results: record.result,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// `{base_url}/{name}`
pub fn image_url(base_url: &str, name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), name)
}
