use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::application::ports::{
    EncodeSession, MediaStore, MediaTranscoder, TranscodeError, TrimRequest,
};
use crate::domain::{StoragePath, sanitize_segment};
use crate::infrastructure::observability::truncate_for_log;

use super::encode_task::EncodeTask;

/// Hosted ffmpeg service. Inputs are uploaded into a per-batch directory,
/// processed remotely, and the result is republished to our media store.
pub struct FfmpegApiTranscoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    store: Arc<dyn MediaStore>,
}

#[derive(Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    dir_id: Option<String>,
    #[serde(default)]
    directory: Option<DirectoryRef>,
}

#[derive(Deserialize)]
struct DirectoryRef {
    id: String,
}

#[derive(Deserialize)]
struct FileResponse {
    file: FileRef,
    upload: UploadTarget,
}

#[derive(Deserialize)]
struct FileRef {
    file_path: String,
}

#[derive(Deserialize)]
struct UploadTarget {
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Vec<ProcessOutput>,
}

#[derive(Deserialize)]
struct ProcessOutput {
    download_url: String,
}

impl FfmpegApiTranscoder {
    pub fn new(api_key: String, base_url: Option<String>, store: Arc<dyn MediaStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.ffmpeg-api.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            store,
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, TranscodeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscodeError::ApiRequestFailed(format!("request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(path, status = status.as_u16(), "Encode service rate limited");
            return Err(TranscodeError::RateLimited {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TranscodeError::ApiRequestFailed(format!("body: {}", e)))?;

        if !status.is_success() {
            return Err(TranscodeError::ApiRequestFailed(format!(
                "status {}: {}",
                status,
                truncate_for_log(&text, 500)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            TranscodeError::InvalidResponse(format!("{}: {}", e, truncate_for_log(&text, 200)))
        })
    }

    /// Copies a media URL into the session directory and returns its remote path.
    async fn upload(
        &self,
        session: &EncodeSession,
        source_url: &str,
        file_name: &str,
    ) -> Result<String, TranscodeError> {
        let created: FileResponse = self
            .post("/file", json!({ "file_name": file_name, "dir_id": session.id() }))
            .await?;

        let data = self.store.fetch(source_url).await?;
        let size = data.len();

        let mut request = self.client.put(&created.upload.url).body(data);
        for (name, value) in &created.upload.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| TranscodeError::TransferFailed(format!("upload: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscodeError::TransferFailed(format!(
                "upload of {} failed with status {}",
                file_name,
                response.status()
            )));
        }

        tracing::debug!(file_name, bytes = size, file_path = %created.file.file_path, "Uploaded to encode service");
        Ok(created.file.file_path)
    }

    async fn process(&self, task: &EncodeTask) -> Result<String, TranscodeError> {
        let response: ProcessResponse = self.post("/ffmpeg/process", json!({ "task": task })).await?;

        if !response.ok {
            return Err(TranscodeError::InvalidResponse(
                "encode service reported failure".to_string(),
            ));
        }
        response
            .result
            .into_iter()
            .next()
            .map(|r| r.download_url)
            .ok_or_else(|| TranscodeError::InvalidResponse("no output produced".to_string()))
    }

    async fn republish(
        &self,
        download_url: &str,
        path: StoragePath,
        content_type: &str,
    ) -> Result<String, TranscodeError> {
        let data = self.store.fetch(download_url).await?;
        let url = self.store.publish(&path, data, content_type).await?;
        tracing::debug!(path = %path, "Encode output republished");
        Ok(url)
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegApiTranscoder {
    async fn open_session(&self) -> Result<EncodeSession, TranscodeError> {
        let response: DirectoryResponse = self.post("/directory", json!({})).await?;
        let id = response
            .directory
            .map(|d| d.id)
            .or(response.id)
            .or(response.dir_id)
            .ok_or_else(|| {
                TranscodeError::InvalidResponse("directory id missing from response".to_string())
            })?;

        tracing::info!(session = %id, "Encode session opened");
        Ok(EncodeSession::new(id))
    }

    async fn extract_audio(
        &self,
        session: &EncodeSession,
        video_url: &str,
        name: &str,
    ) -> Result<String, TranscodeError> {
        let base = sanitize_segment(name);
        let video_path = self
            .upload(session, video_url, &format!("{}_original.mp4", base))
            .await?;

        let task = EncodeTask::extract_audio(&video_path, &format!("{}.wav", base));
        let download_url = self.process(&task).await?;

        self.republish(&download_url, StoragePath::new("audio", name, "wav"), "audio/wav")
            .await
    }

    async fn trim(
        &self,
        session: &EncodeSession,
        request: &TrimRequest,
    ) -> Result<String, TranscodeError> {
        if request.end_ms <= request.start_ms {
            return Err(TranscodeError::InvalidRequest(format!(
                "empty trim window {}..{}ms",
                request.start_ms, request.end_ms
            )));
        }

        let base = sanitize_segment(&request.name);
        let video_path = self
            .upload(session, &request.video_url, &format!("{}_original.mp4", base))
            .await?;
        let audio_path = match &request.replacement_audio_url {
            Some(url) => Some(
                self.upload(session, url, &format!("{}_cleaned.mp3", base))
                    .await?,
            ),
            None => None,
        };

        let task = EncodeTask::trim(
            &video_path,
            audio_path.as_deref(),
            request.start_ms,
            request.end_ms,
            request.overlay.as_ref(),
            &format!("{}_trimmed.mp4", base),
        );
        tracing::debug!(
            start_ms = request.start_ms,
            end_ms = request.end_ms,
            replaced_audio = audio_path.is_some(),
            overlay = request.overlay.is_some(),
            "Submitting trim"
        );
        let download_url = self.process(&task).await?;

        self.republish(
            &download_url,
            StoragePath::new("videos/trimmed", &request.name, "mp4"),
            "video/mp4",
        )
        .await
    }

    async fn concat(
        &self,
        session: &EncodeSession,
        ordered_urls: &[String],
        normalize_loudness: bool,
        name: &str,
    ) -> Result<String, TranscodeError> {
        if ordered_urls.is_empty() {
            return Err(TranscodeError::InvalidRequest("nothing to concatenate".to_string()));
        }

        let base = sanitize_segment(name);
        let mut paths = Vec::with_capacity(ordered_urls.len());
        for (i, url) in ordered_urls.iter().enumerate() {
            let path = self
                .upload(session, url, &format!("{}_part{}.mp4", base, i))
                .await?;
            paths.push(path);
        }

        let task = EncodeTask::concat(&paths, normalize_loudness, &format!("{}.mp4", base));
        let download_url = self.process(&task).await?;

        self.republish(
            &download_url,
            StoragePath::new("videos/merged", name, "mp4"),
            "video/mp4",
        )
        .await
    }
}
