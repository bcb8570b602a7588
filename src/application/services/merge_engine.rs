use std::sync::Arc;

use crate::application::ports::{MediaTranscoder, TranscodeError};
use crate::domain::MergeRequest;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no clips to merge")]
    NoClips,
    #[error("encode: {0}")]
    Transcode(#[from] TranscodeError),
}

/// Concatenates finished clips, in order, into one video.
pub struct MergeEngine {
    transcoder: Arc<dyn MediaTranscoder>,
}

impl MergeEngine {
    pub fn new(transcoder: Arc<dyn MediaTranscoder>) -> Self {
        Self { transcoder }
    }

    pub async fn merge(&self, request: &MergeRequest) -> Result<String, MergeError> {
        match request.ordered_clip_urls.as_slice() {
            [] => Err(MergeError::NoClips),
            [only] => {
                tracing::debug!(url = %only, "Single clip, returned without re-encoding");
                Ok(only.clone())
            }
            urls => {
                let session = self.transcoder.open_session().await?;
                tracing::info!(
                    clips = urls.len(),
                    normalize_loudness = request.normalize_loudness,
                    output = %request.output_name,
                    "Merging clips"
                );
                let url = self
                    .transcoder
                    .concat(
                        &session,
                        urls,
                        request.normalize_loudness,
                        &request.output_name,
                    )
                    .await?;
                Ok(url)
            }
        }
    }
}
