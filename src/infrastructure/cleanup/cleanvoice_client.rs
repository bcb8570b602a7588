use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    CleanupConfig, CleanupEditId, CleanupError, CleanupStatus, VoiceCleaner,
};
use crate::infrastructure::observability::truncate_for_log;

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct CleanVoiceClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CleanVoiceClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.cleanvoice.ai/v2".to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    input: SubmitInput<'a>,
}

#[derive(Serialize)]
struct SubmitInput<'a> {
    files: [&'a str; 1],
    config: &'a CleanupConfig,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct EditResponse {
    status: String,
    #[serde(default)]
    result: Option<EditResult>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct EditResult {
    #[serde(default)]
    download_url: Option<String>,
}

impl EditResponse {
    fn into_status(self) -> Result<CleanupStatus, CleanupError> {
        match self.status.as_str() {
            "PENDING" | "STARTED" | "EDITING" | "EXPORT" => Ok(CleanupStatus::Pending),
            "SUCCESS" => Ok(CleanupStatus::Success {
                download_url: self.result.and_then(|r| r.download_url),
            }),
            "FAILURE" => Ok(CleanupStatus::Failure {
                message: match self.error {
                    Some(serde_json::Value::String(message)) => message,
                    Some(other) => other.to_string(),
                    None => "cleanup service reported failure".to_string(),
                },
            }),
            other => Err(CleanupError::ApiRequestFailed(format!(
                "unknown edit status {}",
                other
            ))),
        }
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    format!("status {}: {}", status, truncate_for_log(&body, 500))
}

#[async_trait]
impl VoiceCleaner for CleanVoiceClient {
    async fn submit(
        &self,
        audio_url: &str,
        config: &CleanupConfig,
    ) -> Result<CleanupEditId, CleanupError> {
        let url = format!("{}/edits", self.base_url);
        let body = SubmitBody {
            input: SubmitInput {
                files: [audio_url],
                config,
            },
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(CleanupError::ApiRequestFailed(error_body(response).await));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("body: {}", e)))?;

        tracing::debug!(edit_id = %parsed.id, "CleanVoice edit created");
        Ok(CleanupEditId::new(parsed.id))
    }

    async fn poll(&self, edit_id: &CleanupEditId) -> Result<CleanupStatus, CleanupError> {
        let url = format!("{}/edits/{}", self.base_url, edit_id);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(CleanupError::ApiRequestFailed(error_body(response).await));
        }

        let parsed: EditResponse = response
            .json()
            .await
            .map_err(|e| CleanupError::ApiRequestFailed(format!("body: {}", e)))?;

        parsed.into_status()
    }
}
