use async_trait::async_trait;

use crate::domain::TextOverlay;

/// Grouping token of the encode service. Created once per batch and shared
/// read-only by every job in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSession {
    id: String,
}

impl EncodeSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct TrimRequest {
    pub video_url: String,
    pub name: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub replacement_audio_url: Option<String>,
    pub overlay: Option<TextOverlay>,
}

impl TrimRequest {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    async fn open_session(&self) -> Result<EncodeSession, TranscodeError>;

    /// Mono, fixed sample rate audio track of a clip.
    async fn extract_audio(
        &self,
        session: &EncodeSession,
        video_url: &str,
        name: &str,
    ) -> Result<String, TranscodeError>;

    async fn trim(
        &self,
        session: &EncodeSession,
        request: &TrimRequest,
    ) -> Result<String, TranscodeError>;

    async fn concat(
        &self,
        session: &EncodeSession,
        ordered_urls: &[String],
        normalize_loudness: bool,
        name: &str,
    ) -> Result<String, TranscodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("rate limited by encode service (status {status})")]
    RateLimited { status: u16 },
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("media transfer failed: {0}")]
    TransferFailed(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("storage: {0}")]
    Storage(#[from] super::StorageError),
}

impl TranscodeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TranscodeError::RateLimited { .. })
    }
}
