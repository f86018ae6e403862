use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database request for recording a processed upload
#[derive(Debug, Clone)]
pub struct ImageCreateDBRequest {
    /// Name of the stored object (the generated unique name)
    pub path: String,
    /// Snapshot of the task results, including the nested `errors` map
    pub result: serde_json::Value,
}

/// A processed-image record as stored in the `images` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageDBResponse {
    pub id: i64,
    pub path: String,
    pub result: Option<serde_json::Value>,
    pub uploaded_at: DateTime<Utc>,
}
