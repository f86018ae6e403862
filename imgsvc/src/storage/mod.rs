//! Storage backends for uploaded images.
//!
//! The pipeline depends on two capabilities, [`FileWriter`] and [`FileReader`]. Both are
//! implemented by [`FileStorage`], which has exactly two variants:
//!
//! - [`FileStorage::Local`]: a directory on the local filesystem (`upload_type: local`)
//! - [`FileStorage::Remote`]: a bucket in an S3-compatible object store (`upload_type: remote`)
//!
//! The variant is resolved once at startup by [`create_file_storage`].

pub mod local;
pub mod remote;

pub use local::LocalFileStorage;
pub use remote::{ObjectStoreClient, RemoteFileStorage};

use crate::config::StorageConfig;
use crate::upload::UploadedFile;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Selector value for the local filesystem backend
pub const LOCAL_UPLOAD: &str = "local";
/// Selector value for the object store backend
pub const REMOTE_UPLOAD: &str = "remote";

/// Content type reported when the backend has nothing better
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested object does not exist, or the backend failed to produce it
    #[error("Stored object '{name}' not found")]
    NotFound { name: String },

    /// The storage backend could not be built from configuration
    #[error("Invalid storage configuration: {message}")]
    Configuration { message: String },

    /// The object name cannot be mapped onto the backend safely
    #[error("Invalid object name '{name}'")]
    InvalidName { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Raw content of a stored object along with its media type
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub content: Bytes,
    pub content_type: String,
}

/// Persists upload bytes under a logical name
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Durably write `file` under `name`. A successful return means the object is retrievable.
    async fn save(&self, file: &UploadedFile, name: &str) -> Result<()>;
}

/// Retrieves stored objects by name
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Fetch the object stored under `name`; fails with [`StorageError::NotFound`] otherwise.
    async fn get_response(&self, name: &str) -> Result<StoredFile>;
}

/// The configured storage backend
#[derive(Clone)]
pub enum FileStorage {
    Local(LocalFileStorage),
    Remote(RemoteFileStorage),
}

impl FileStorage {
    /// Selector value this backend was built from
    pub fn kind(&self) -> &'static str {
        match self {
            FileStorage::Local(_) => LOCAL_UPLOAD,
            FileStorage::Remote(_) => REMOTE_UPLOAD,
        }
    }
}

#[async_trait]
impl FileWriter for FileStorage {
    async fn save(&self, file: &UploadedFile, name: &str) -> Result<()> {
        match self {
            FileStorage::Local(storage) => storage.save(file, name).await,
            FileStorage::Remote(storage) => storage.save(file, name).await,
        }
    }
}

#[async_trait]
impl FileReader for FileStorage {
    async fn get_response(&self, name: &str) -> Result<StoredFile> {
        match self {
            FileStorage::Local(storage) => storage.get_response(name).await,
            FileStorage::Remote(storage) => storage.get_response(name).await,
        }
    }
}

/// Create the storage backend selected by `storage.upload_type`.
///
/// Accepts `local` (alias `lcl`) and `remote` (alias `s3`), case-insensitively. Anything else
/// is logged and reported as [`StorageError::Configuration`].
pub async fn create_file_storage(config: &StorageConfig) -> Result<FileStorage> {
    match config.upload_type.trim().to_ascii_lowercase().as_str() {
        LOCAL_UPLOAD | "lcl" => {
            let path = config.upload_path.clone().ok_or_else(|| StorageError::Configuration {
                message: "storage.upload_path is required for local storage".to_string(),
            })?;
            tracing::info!("Creating local file storage backend (path: {:?})", path);
            Ok(FileStorage::Local(LocalFileStorage::new(path)))
        }
        REMOTE_UPLOAD | "s3" => {
            let bucket_name = config.bucket_name.clone().ok_or_else(|| StorageError::Configuration {
                message: "storage.bucket_name is required for remote storage".to_string(),
            })?;
            tracing::info!("Creating object store backend (bucket: {})", bucket_name);
            let client = remote::s3_client(config.region.as_deref(), config.endpoint_url.as_deref()).await;
            Ok(FileStorage::Remote(RemoteFileStorage::new(bucket_name, Arc::new(client))))
        }
        other => {
            tracing::warn!(
                upload_type = other,
                "Only '{}' and '{}' are supported for storage.upload_type",
                LOCAL_UPLOAD,
                REMOTE_UPLOAD
            );
            Err(StorageError::Configuration {
                message: format!("unsupported upload_type '{other}', expected '{LOCAL_UPLOAD}' or '{REMOTE_UPLOAD}'"),
            })
        }
    }
}
