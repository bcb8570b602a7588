use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    CleanupConfig, CleanupError, CleanupStatus, MediaStore, VoiceCleaner,
};
use crate::domain::StoragePath;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_POLLS: u32 = 60;

/// Submits audio to the cleanup service, waits for the edit to finish and
/// republishes the result to our own storage.
pub struct VoiceCleanupService {
    cleaner: Arc<dyn VoiceCleaner>,
    store: Arc<dyn MediaStore>,
    config: CleanupConfig,
    poll_interval: Duration,
    max_polls: u32,
}

impl VoiceCleanupService {
    pub fn new(cleaner: Arc<dyn VoiceCleaner>, store: Arc<dyn MediaStore>) -> Self {
        Self {
            cleaner,
            store,
            config: CleanupConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    pub fn with_config(mut self, config: CleanupConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    pub async fn clean(&self, audio_url: &str, name: &str) -> Result<String, CleanupError> {
        let edit_id = self.cleaner.submit(audio_url, &self.config).await?;
        tracing::info!(edit_id = %edit_id, clip = name, "Cleanup submitted");

        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            match self.cleaner.poll(&edit_id).await? {
                CleanupStatus::Pending => {
                    tracing::debug!(edit_id = %edit_id, attempt, "Cleanup still running");
                }
                CleanupStatus::Success { download_url } => {
                    let download_url = download_url.ok_or(CleanupError::MissingResult)?;
                    tracing::info!(edit_id = %edit_id, attempt, "Cleanup finished");
                    return self.republish(&download_url, name).await;
                }
                CleanupStatus::Failure { message } => {
                    tracing::warn!(edit_id = %edit_id, error = %message, "Cleanup failed");
                    return Err(CleanupError::Failed(message));
                }
            }
        }

        Err(CleanupError::TimedOut {
            attempts: self.max_polls,
        })
    }

    async fn republish(&self, download_url: &str, name: &str) -> Result<String, CleanupError> {
        let data = self.store.fetch(download_url).await?;
        let extension = match self.config.export_format.as_str() {
            "" => "mp3",
            other => other,
        };
        let path = StoragePath::new("audio", &format!("{}-cleaned", name), extension);
        let url = self
            .store
            .publish(&path, data, &audio_content_type(extension))
            .await?;
        Ok(url)
    }
}

fn audio_content_type(extension: &str) -> String {
    match extension {
        "mp3" => "audio/mpeg".to_string(),
        "wav" => "audio/wav".to_string(),
        other => format!("audio/{}", other),
    }
}
