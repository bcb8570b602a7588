use async_trait::async_trait;

use crate::domain::TranscriptWord;

/// Word-level transcript of one audio file.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub words: Vec<TranscriptWord>,
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio_url: &str,
        language: &str,
    ) -> Result<Transcript, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio download failed: {0}")]
    DownloadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("transcript contains no words")]
    NoWords,
}
