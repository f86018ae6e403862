use super::{FileReader, FileWriter, Result, StorageError, StoredFile};
use crate::upload::UploadedFile;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend - stores each object as a file in one directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Map an object name onto a file directly inside `base_path`.
    ///
    /// Returns `None` for anything that is not a single plain path component.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.contains(['/', '\\']) {
            return None;
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => Some(self.base_path.join(part)),
            _ => None,
        }
    }
}

#[async_trait]
impl FileWriter for LocalFileStorage {
    async fn save(&self, file: &UploadedFile, name: &str) -> Result<()> {
        let full_path = self.resolve(name).ok_or_else(|| StorageError::InvalidName { name: name.to_string() })?;

        fs::create_dir_all(&self.base_path).await?;

        let mut out = fs::File::create(&full_path).await?;
        out.write_all(&file.content).await?;
        out.sync_all().await?;

        tracing::debug!(path = ?full_path, bytes = file.content.len(), "Stored upload on local filesystem");
        Ok(())
    }
}

#[async_trait]
impl FileReader for LocalFileStorage {
    async fn get_response(&self, name: &str) -> Result<StoredFile> {
        let not_found = || StorageError::NotFound { name: name.to_string() };

        let full_path = self.resolve(name).ok_or_else(not_found)?;

        match fs::metadata(&full_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        let content = fs::read(&full_path).await.map_err(|e| match e.kind() {
            // Removed between the metadata check and the read
            std::io::ErrorKind::NotFound => not_found(),
            _ => StorageError::Io(e),
        })?;

        let content_type = mime_guess::from_path(&full_path).first_or_octet_stream().essence_str().to_string();

        Ok(StoredFile {
            content: Bytes::from(content),
            content_type,
        })
    }
}
