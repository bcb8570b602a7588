use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{MediaStore, StorageError};
use crate::domain::StoragePath;

use super::bunny_store::download;

/// Filesystem-backed media store for local runs. Objects are addressed as
/// `{public_base_url}/{path}`; URLs under that base are read straight from
/// disk, anything else is downloaded over HTTP.
pub struct LocalMediaStore {
    inner: Arc<LocalFileSystem>,
    public_base_url: String,
    client: reqwest::Client,
}

impl LocalMediaStore {
    pub fn new(base_path: PathBuf, public_base_url: &str) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&base_path).map_err(StorageError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| StorageError::Misconfigured(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn local_key<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn publish(
        &self,
        path: &StoragePath,
        data: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base_url, path))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, StorageError> {
        let Some(key) = self.local_key(url) else {
            return download(&self.client, url).await;
        };

        let store_path = StorePath::from(key);
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::NotFound(url.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }
}
