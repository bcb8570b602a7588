use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    CleanupError, EncodeSession, MediaTranscoder, TranscodeError, TranscriptionEngine,
    TranscriptionError, TrimRequest,
};
use crate::domain::{ClipJob, ClipJobId, ClipPhase};

use super::speech_aligner::{AlignmentError, AlignmentStatus, SpeechAligner};
use super::voice_cleanup_service::VoiceCleanupService;

pub const DEFAULT_LANGUAGE: &str = "ro";

/// A job entered a new non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub job_id: ClipJobId,
    pub phase: ClipPhase,
}

#[derive(Debug)]
pub enum JobOutcome {
    /// The job reached `Done` or `Failed`.
    Finished(ClipJob),
    /// The encode service refused the work; the job is handed back untouched
    /// by any failure so it can be scheduled again.
    RateLimited(ClipJob),
}

impl JobOutcome {
    pub fn job(&self) -> &ClipJob {
        match self {
            JobOutcome::Finished(job) | JobOutcome::RateLimited(job) => job,
        }
    }

    pub fn into_job(self) -> ClipJob {
        match self {
            JobOutcome::Finished(job) | JobOutcome::RateLimited(job) => job,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClipJobError {
    #[error("encode: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("cleanup: {0}")]
    Cleanup(#[from] CleanupError),
    #[error("alignment: {0}")]
    Alignment(#[from] AlignmentError),
}

impl ClipJobError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClipJobError::Transcode(e) if e.is_rate_limited())
    }
}

/// Drives one clip from source video to trimmed clip.
pub struct ClipJobRunner {
    transcoder: Arc<dyn MediaTranscoder>,
    transcription: Arc<dyn TranscriptionEngine>,
    cleanup: Arc<VoiceCleanupService>,
    aligner: Arc<SpeechAligner>,
    language: String,
}

impl ClipJobRunner {
    pub fn new(
        transcoder: Arc<dyn MediaTranscoder>,
        transcription: Arc<dyn TranscriptionEngine>,
        cleanup: Arc<VoiceCleanupService>,
        aligner: Arc<SpeechAligner>,
    ) -> Self {
        Self {
            transcoder,
            transcription,
            cleanup,
            aligner,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub async fn run(
        &self,
        mut job: ClipJob,
        session: &EncodeSession,
        events: mpsc::Sender<PhaseEvent>,
    ) -> JobOutcome {
        let span = tracing::info_span!(
            "clip_job",
            job_id = %job.id.as_uuid(),
            name = %job.name,
        );

        async move {
            tracing::info!("Clip job started");
            match self.process(&mut job, session, &events).await {
                Ok(()) => {
                    job.advance(ClipPhase::Done);
                    tracing::info!(final_clip_url = ?job.final_clip_url, "Clip job completed");
                    JobOutcome::Finished(job)
                }
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(error = %e, phase = %job.phase, "Clip job rate limited");
                    JobOutcome::RateLimited(job)
                }
                Err(e) => {
                    tracing::error!(error = %e, phase = %job.phase, "Clip job failed");
                    job.fail(e.to_string());
                    JobOutcome::Finished(job)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        job: &mut ClipJob,
        session: &EncodeSession,
        events: &mpsc::Sender<PhaseEvent>,
    ) -> Result<(), ClipJobError> {
        self.enter(job, ClipPhase::Extracting, events).await;
        let audio_url = self
            .transcoder
            .extract_audio(session, &job.source_url, &job.name)
            .await?;
        tracing::debug!(audio_url = %audio_url, "Audio extracted");
        job.audio_url = Some(audio_url.clone());

        self.enter(job, ClipPhase::Aligning, events).await;
        let (transcript, cleaned_audio_url) = tokio::try_join!(
            async {
                self.transcription
                    .transcribe(&audio_url, &self.language)
                    .await
                    .map_err(ClipJobError::from)
            },
            async {
                self.cleanup
                    .clean(&audio_url, &job.name)
                    .await
                    .map_err(ClipJobError::from)
            },
        )?;
        job.cleaned_audio_url = Some(cleaned_audio_url.clone());

        let alignment = match self.aligner.compute_cut_points(&job.script, &transcript.words) {
            Ok(alignment) => alignment,
            Err(e) => {
                job.alignment_log = e.log().to_vec();
                return Err(e.into());
            }
        };
        tracing::info!(
            strategy = alignment.strategy,
            start_keep_ms = alignment.cut_points.start_keep_ms,
            end_keep_ms = alignment.cut_points.end_keep_ms,
            confidence = alignment.cut_points.confidence,
            "Cut points computed"
        );
        if alignment.status == AlignmentStatus::Warning {
            job.warnings.push(format!(
                "alignment fell back to keeping the whole clip (confidence {:.2})",
                alignment.cut_points.confidence
            ));
        }
        job.alignment_log = alignment.log;
        job.cut_points = Some(alignment.cut_points);

        self.enter(job, ClipPhase::Assembling, events).await;
        let request = TrimRequest {
            video_url: job.source_url.clone(),
            name: job.name.clone(),
            start_ms: alignment.cut_points.start_keep_ms,
            end_ms: alignment.cut_points.end_keep_ms,
            replacement_audio_url: Some(cleaned_audio_url),
            overlay: job.overlay.clone(),
        };
        let clip_url = self.transcoder.trim(session, &request).await?;
        job.final_clip_url = Some(clip_url);

        Ok(())
    }

    async fn enter(&self, job: &mut ClipJob, phase: ClipPhase, events: &mpsc::Sender<PhaseEvent>) {
        tracing::debug!(from = %job.phase, to = %phase, "Clip phase transition");
        job.advance(phase);
        // A dropped receiver only means nobody is watching progress.
        let _ = events
            .send(PhaseEvent {
                job_id: job.id,
                phase,
            })
            .await;
    }
}
