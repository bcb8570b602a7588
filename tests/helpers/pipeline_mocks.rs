#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use reelcut::application::ports::{
    CleanupConfig, CleanupEditId, CleanupError, CleanupStatus, EncodeSession, MediaStore,
    MediaTranscoder, StorageError, TranscodeError, Transcript, TranscriptionEngine,
    TranscriptionError, TrimRequest, VoiceCleaner,
};
use reelcut::application::services::{ClipJobRunner, SpeechAligner, VoiceCleanupService};
use reelcut::domain::{StoragePath, TranscriptWord};

/// Transcoder double that answers from memory and records what it was asked.
#[derive(Default)]
pub struct MockTranscoder {
    pub sessions_opened: AtomicUsize,
    pub fail_session: bool,
    /// Clip names or source urls whose extraction fails.
    pub fail_extract_for: HashSet<String>,
    pub panic_extract_for: HashSet<String>,
    /// Clip name -> how many trims still answer with a rate limit.
    pub rate_limited_trims: Mutex<HashMap<String, u32>>,
    pub extract_delay: Option<Duration>,
    pub extracted: Mutex<Vec<String>>,
    pub trims: Mutex<Vec<TrimRequest>>,
    pub concats: Mutex<Vec<(Vec<String>, bool, String)>>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl MockTranscoder {
    pub fn rate_limit_trims(self, name: &str, times: u32) -> Self {
        self.rate_limited_trims
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    pub fn extracted_names(&self) -> Vec<String> {
        self.extracted.lock().unwrap().clone()
    }

    pub fn trimmed_names(&self) -> Vec<String> {
        self.trims
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }
}

#[async_trait]
impl MediaTranscoder for MockTranscoder {
    async fn open_session(&self) -> Result<EncodeSession, TranscodeError> {
        if self.fail_session {
            return Err(TranscodeError::ApiRequestFailed("status 500: down".to_string()));
        }
        let n = self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(EncodeSession::new(format!("dir-{}", n)))
    }

    async fn extract_audio(
        &self,
        _session: &EncodeSession,
        video_url: &str,
        name: &str,
    ) -> Result<String, TranscodeError> {
        if self.panic_extract_for.contains(name) {
            panic!("extractor crashed on {}", name);
        }
        self.extracted.lock().unwrap().push(name.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.extract_delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_extract_for.contains(name) || self.fail_extract_for.contains(video_url) {
            return Err(TranscodeError::ApiRequestFailed("status 500: boom".to_string()));
        }
        Ok(format!("mem://audio/{}.wav", name))
    }

    async fn trim(
        &self,
        _session: &EncodeSession,
        request: &TrimRequest,
    ) -> Result<String, TranscodeError> {
        {
            let mut limited = self.rate_limited_trims.lock().unwrap();
            if let Some(left) = limited.get_mut(&request.name) {
                if *left > 0 {
                    *left -= 1;
                    return Err(TranscodeError::RateLimited { status: 403 });
                }
            }
        }
        self.trims.lock().unwrap().push(request.clone());
        Ok(format!("mem://videos/{}.mp4", request.name))
    }

    async fn concat(
        &self,
        _session: &EncodeSession,
        ordered_urls: &[String],
        normalize_loudness: bool,
        name: &str,
    ) -> Result<String, TranscodeError> {
        self.concats.lock().unwrap().push((
            ordered_urls.to_vec(),
            normalize_loudness,
            name.to_string(),
        ));
        Ok(format!("mem://merged/{}.mp4", name))
    }
}

/// Speaks back a fixed line per clip, 400 ms per word.
#[derive(Default)]
pub struct MockTranscription {
    pub spoken: HashMap<String, String>,
    pub fail_for: HashSet<String>,
}

impl MockTranscription {
    pub fn speaking(mut self, name: &str, text: &str) -> Self {
        self.spoken.insert(name.to_string(), text.to_string());
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.fail_for.insert(name.to_string());
        self
    }
}

pub fn evenly_spaced(text: &str, step_ms: u64) -> Vec<TranscriptWord> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| TranscriptWord::new(w, i as u64 * step_ms, (i as u64 + 1) * step_ms))
        .collect()
}

fn clip_name(audio_url: &str) -> &str {
    audio_url
        .rsplit('/')
        .next()
        .unwrap_or(audio_url)
        .trim_end_matches(".wav")
}

#[async_trait]
impl TranscriptionEngine for MockTranscription {
    async fn transcribe(
        &self,
        audio_url: &str,
        _language: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let name = clip_name(audio_url);
        if self.fail_for.contains(name) {
            return Err(TranscriptionError::ApiRequestFailed(
                "status 500: whisper down".to_string(),
            ));
        }
        let text = self.spoken.get(name).ok_or(TranscriptionError::NoWords)?;
        Ok(Transcript {
            text: text.clone(),
            words: evenly_spaced(text, 400),
            raw: serde_json::Value::Null,
        })
    }
}

/// Cleanup vendor that finishes on the first poll.
pub struct InstantCleaner;

#[async_trait]
impl VoiceCleaner for InstantCleaner {
    async fn submit(
        &self,
        audio_url: &str,
        _config: &CleanupConfig,
    ) -> Result<CleanupEditId, CleanupError> {
        Ok(CleanupEditId::new(audio_url))
    }

    async fn poll(&self, edit_id: &CleanupEditId) -> Result<CleanupStatus, CleanupError> {
        Ok(CleanupStatus::Success {
            download_url: Some(format!("{}.cleaned", edit_id)),
        })
    }
}

/// Cleanup vendor that accepts the audio and then reports a failed edit.
pub struct FailingCleaner {
    pub message: String,
}

impl FailingCleaner {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl VoiceCleaner for FailingCleaner {
    async fn submit(
        &self,
        audio_url: &str,
        _config: &CleanupConfig,
    ) -> Result<CleanupEditId, CleanupError> {
        Ok(CleanupEditId::new(audio_url))
    }

    async fn poll(&self, _edit_id: &CleanupEditId) -> Result<CleanupStatus, CleanupError> {
        Ok(CleanupStatus::Failure {
            message: self.message.clone(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    pub published: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn publish(
        &self,
        path: &StoragePath,
        _data: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.published.lock().unwrap().push(path.to_string());
        Ok(format!("mem://{}", path))
    }

    async fn fetch(&self, _url: &str) -> Result<Bytes, StorageError> {
        Ok(Bytes::from_static(b"media"))
    }
}

pub fn build_runner(
    transcoder: Arc<MockTranscoder>,
    transcription: Arc<MockTranscription>,
) -> Arc<ClipJobRunner> {
    build_runner_with_cleaner(transcoder, transcription, Arc::new(InstantCleaner))
}

pub fn build_runner_with_cleaner(
    transcoder: Arc<MockTranscoder>,
    transcription: Arc<MockTranscription>,
    cleaner: Arc<dyn VoiceCleaner>,
) -> Arc<ClipJobRunner> {
    let cleanup = Arc::new(
        VoiceCleanupService::new(cleaner, Arc::new(InMemoryStore::default()))
            .with_polling(Duration::from_millis(10), 3),
    );
    Arc::new(ClipJobRunner::new(
        transcoder,
        transcription,
        cleanup,
        Arc::new(SpeechAligner::default()),
    ))
}
