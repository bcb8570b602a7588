use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CleanupEditId(String);

impl CleanupEditId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanupEditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    Pending,
    Success { download_url: Option<String> },
    Failure { message: String },
}

/// Processing options sent with every cleanup submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub video: bool,
    pub export_format: String,
    pub breath: String,
    pub normalize: bool,
    pub remove_noise: bool,
    pub studio_sound: String,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            video: false,
            export_format: "mp3".to_string(),
            breath: "mute".to_string(),
            normalize: true,
            remove_noise: true,
            studio_sound: "nightly".to_string(),
        }
    }
}

#[async_trait]
pub trait VoiceCleaner: Send + Sync {
    async fn submit(
        &self,
        audio_url: &str,
        config: &CleanupConfig,
    ) -> Result<CleanupEditId, CleanupError>;

    async fn poll(&self, edit_id: &CleanupEditId) -> Result<CleanupStatus, CleanupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("cleanup failed: {0}")]
    Failed(String),
    #[error("cleanup timed out after {attempts} polls")]
    TimedOut { attempts: u32 },
    #[error("cleanup succeeded without a download url")]
    MissingResult,
    #[error("storage: {0}")]
    Storage(#[from] super::StorageError),
}
