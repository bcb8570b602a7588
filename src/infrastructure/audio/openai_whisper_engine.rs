use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{Transcript, TranscriptionEngine, TranscriptionError};
use crate::domain::TranscriptWord;
use crate::infrastructure::observability::truncate_for_log;

pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
        }
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, TranscriptionError> {
        let response = self
            .client
            .get(audio_url)
            .send()
            .await
            .map_err(|e| TranscriptionError::DownloadFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscriptionError::DownloadFailed(format!(
                "status {} for {}",
                response.status(),
                audio_url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TranscriptionError::DownloadFailed(format!("body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

/// Absorbs binary representation error so that x.xxx5 rounds up.
const ROUNDING_EPSILON_MS: f64 = 1e-6;

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0 + ROUNDING_EPSILON_MS).round() as u64
}

/// Converts vendor words to millisecond words. Zero-length words are widened
/// to one millisecond.
fn to_transcript_words(words: Vec<WhisperWord>) -> Vec<TranscriptWord> {
    words
        .into_iter()
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| {
            let start_ms = seconds_to_ms(w.start);
            let end_ms = seconds_to_ms(w.end).max(start_ms + 1);
            TranscriptWord::new(w.word.trim(), start_ms, end_ms)
        })
        .collect()
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        audio_url: &str,
        language: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let audio_data = self.download(audio_url).await?;
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .part("file", file_part);

        tracing::debug!(model = %self.model, language, "Sending audio to OpenAI Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status,
                truncate_for_log(&body, 500)
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("body: {}", e)))?;
        let parsed: VerboseTranscription = serde_json::from_value(raw.clone())
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let words = to_transcript_words(parsed.words);
        if words.is_empty() {
            return Err(TranscriptionError::NoWords);
        }

        tracing::info!(
            words = words.len(),
            chars = parsed.text.len(),
            "OpenAI Whisper transcription completed"
        );

        Ok(Transcript {
            text: parsed.text.trim().to_string(),
            words,
            raw,
        })
    }
}
