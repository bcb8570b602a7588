use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ClipPhase, CutPoints, ScriptSegment, TextOverlay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClipJobId(Uuid);

impl ClipJobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClipJobId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-clip record carried through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ClipJob {
    pub id: ClipJobId,
    pub name: String,
    pub source_url: String,
    pub script: ScriptSegment,
    pub overlay: Option<TextOverlay>,
    pub phase: ClipPhase,
    pub audio_url: Option<String>,
    pub cleaned_audio_url: Option<String>,
    pub cut_points: Option<CutPoints>,
    pub final_clip_url: Option<String>,
    pub alignment_log: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub rate_limit_hits: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClipJob {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>, script: ScriptSegment) -> Self {
        let now = Utc::now();
        Self {
            id: ClipJobId::new(),
            name: name.into(),
            source_url: source_url.into(),
            script,
            overlay: None,
            phase: ClipPhase::Queued,
            audio_url: None,
            cleaned_audio_url: None,
            cut_points: None,
            final_clip_url: None,
            alignment_log: Vec::new(),
            warnings: Vec::new(),
            error: None,
            rate_limit_hits: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_overlay(mut self, overlay: TextOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn advance(&mut self, phase: ClipPhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.advance(ClipPhase::Failed);
    }

    /// Puts the job back at the start of the pipeline, dropping everything a
    /// previous attempt produced.
    pub fn reset(&mut self) {
        self.audio_url = None;
        self.cleaned_audio_url = None;
        self.cut_points = None;
        self.final_clip_url = None;
        self.alignment_log.clear();
        self.warnings.clear();
        self.error = None;
        self.advance(ClipPhase::Queued);
    }
}
