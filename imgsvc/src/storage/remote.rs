use super::{DEFAULT_CONTENT_TYPE, FileReader, FileWriter, Result, StorageError, StoredFile};
use crate::upload::UploadedFile;
use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_s3::{config::Region, error::DisplayErrorContext, primitives::ByteStream};
use bytes::Bytes;
use std::sync::Arc;

/// An object fetched from the store
#[derive(Debug, Clone)]
pub struct ObjectContent {
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Minimal object store surface used by [`RemoteFileStorage`].
///
/// Implemented for [`aws_sdk_s3::Client`]; tests substitute an in-process fake.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn upload(&self, bucket: &str, key: &str, body: Bytes, content_type: Option<&str>) -> anyhow::Result<()>;

    async fn download(&self, bucket: &str, key: &str) -> anyhow::Result<ObjectContent>;
}

#[async_trait]
impl ObjectStoreClient for aws_sdk_s3::Client {
    async fn upload(&self, bucket: &str, key: &str, body: Bytes, content_type: Option<&str>) -> anyhow::Result<()> {
        let mut request = self.put_object().bucket(bucket).key(key).body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| anyhow!("PutObject {}/{} failed: {}", bucket, key, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str) -> anyhow::Result<ObjectContent> {
        let output = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!("GetObject {}/{} failed: {}", bucket, key, DisplayErrorContext(&e)))?;

        let content_type = output.content_type().map(str::to_owned);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| anyhow!("Reading body of {}/{} failed: {}", bucket, key, e))?
            .into_bytes();

        Ok(ObjectContent { body, content_type })
    }
}

/// Build an S3 client from the default credential chain.
///
/// `region` and `endpoint_url` override the environment; a custom endpoint switches to
/// path-style addressing, which S3-compatible stores such as MinIO expect.
pub async fn s3_client(region: Option<&str>, endpoint_url: Option<&str>) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    if let Some(endpoint_url) = endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(endpoint_url.is_some())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Object store backend - stores each upload as an object in one bucket
#[derive(Clone)]
pub struct RemoteFileStorage {
    bucket_name: String,
    client: Arc<dyn ObjectStoreClient>,
}

impl RemoteFileStorage {
    pub fn new(bucket_name: String, client: Arc<dyn ObjectStoreClient>) -> Self {
        Self { bucket_name, client }
    }
}

#[async_trait]
impl FileWriter for RemoteFileStorage {
    async fn save(&self, file: &UploadedFile, name: &str) -> Result<()> {
        self.client
            .upload(&self.bucket_name, name, file.content.clone(), file.content_type.as_deref())
            .await
            .map_err(StorageError::Other)?;

        tracing::debug!(bucket = %self.bucket_name, key = name, bytes = file.content.len(), "Stored upload in object store");
        Ok(())
    }
}

#[async_trait]
impl FileReader for RemoteFileStorage {
    async fn get_response(&self, name: &str) -> Result<StoredFile> {
        match self.client.download(&self.bucket_name, name).await {
            Ok(object) => Ok(StoredFile {
                content: object.body,
                content_type: object.content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            }),
            Err(e) => {
                // Backend errors are logged, callers only ever see NotFound
                tracing::error!(bucket = %self.bucket_name, key = name, "Failed to fetch object: {:#}", e);
                Err(StorageError::NotFound { name: name.to_string() })
            }
        }
    }
}
