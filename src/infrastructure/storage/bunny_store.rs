use async_trait::async_trait;
use bytes::Bytes;

use crate::application::ports::{MediaStore, StorageError};
use crate::domain::StoragePath;
use crate::infrastructure::observability::truncate_for_log;

const ACCESS_KEY_HEADER: &str = "AccessKey";

/// Bunny.net storage zone fronted by a pull zone. Objects are uploaded to the
/// storage API and served from the pull zone hostname.
pub struct BunnyMediaStore {
    client: reqwest::Client,
    storage_url: String,
    zone: String,
    access_key: String,
    pull_zone_url: String,
}

impl BunnyMediaStore {
    pub fn new(
        zone: &str,
        access_key: &str,
        pull_zone_url: &str,
        storage_url: Option<String>,
    ) -> Result<Self, StorageError> {
        if zone.trim().is_empty() || access_key.trim().is_empty() {
            return Err(StorageError::Misconfigured(
                "bunny zone and access key are required".to_string(),
            ));
        }
        if pull_zone_url.trim().is_empty() {
            return Err(StorageError::Misconfigured(
                "bunny pull zone url is required".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            storage_url: storage_url
                .unwrap_or_else(|| "https://storage.bunnycdn.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            zone: zone.trim_matches('/').to_string(),
            access_key: access_key.to_string(),
            pull_zone_url: pull_zone_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.pull_zone_url, path)
    }
}

#[async_trait]
impl MediaStore for BunnyMediaStore {
    async fn publish(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/{}/{}", self.storage_url, self.zone, path);
        let size = data.len();

        let response = self
            .client
            .put(&url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(StorageError::UploadFailed(format!(
                "status {}: {}",
                status,
                truncate_for_log(&body, 300)
            )));
        }

        tracing::debug!(path = %path, bytes = size, "Published to Bunny storage");
        Ok(self.public_url(path))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, StorageError> {
        download(&self.client, url).await
    }
}

/// Plain HTTP GET of a media URL.
pub(super) async fn download(client: &reqwest::Client, url: &str) -> Result<Bytes, StorageError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| StorageError::DownloadFailed(format!("request: {}", e)))?;

    match response.status() {
        status if status.is_success() => response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("body: {}", e))),
        reqwest::StatusCode::NOT_FOUND => Err(StorageError::NotFound(url.to_string())),
        status => Err(StorageError::DownloadFailed(format!(
            "status {} for {}",
            status, url
        ))),
    }
}
