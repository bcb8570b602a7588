use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::StoragePath;

/// Durable storage for produced media. Published objects get a stable public URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn publish(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn fetch(&self, url: &str) -> Result<Bytes, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("misconfigured store: {0}")]
    Misconfigured(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
