use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ClipJob, ClipJobId, ClipPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
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

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// The three progress sections a batch reports separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Extract,
    Align,
    Assemble,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [PhaseKind::Extract, PhaseKind::Align, PhaseKind::Assemble];

    pub fn of(phase: ClipPhase) -> Option<PhaseKind> {
        match phase {
            ClipPhase::Extracting => Some(PhaseKind::Extract),
            ClipPhase::Aligning => Some(PhaseKind::Align),
            ClipPhase::Assembling => Some(PhaseKind::Assemble),
            _ => None,
        }
    }
}

/// A clip as listed in a phase section. Names may repeat within a batch,
/// so entries are matched by job id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipRef {
    pub job_id: ClipJobId,
    pub name: String,
}

impl ClipRef {
    fn new(job_id: ClipJobId, name: &str) -> Self {
        Self {
            job_id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedClip {
    pub job_id: ClipJobId,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub total: usize,
    pub completed: usize,
    pub active: Vec<ClipRef>,
    pub succeeded: Vec<ClipRef>,
    pub failed: Vec<FailedClip>,
}

impl PhaseProgress {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn start(&mut self, job_id: ClipJobId, name: &str) {
        if !self.active.iter().any(|c| c.job_id == job_id) {
            self.active.push(ClipRef::new(job_id, name));
        }
    }

    pub fn succeed(&mut self, job_id: ClipJobId, name: &str) {
        self.deactivate(job_id);
        self.succeeded.push(ClipRef::new(job_id, name));
        self.recount();
    }

    pub fn fail(&mut self, job_id: ClipJobId, name: &str, error: &str) {
        self.deactivate(job_id);
        self.failed.push(FailedClip {
            job_id,
            name: name.to_string(),
            error: error.to_string(),
        });
        self.recount();
    }

    /// Drops a clip from the active list without recording an outcome.
    pub fn deactivate(&mut self, job_id: ClipJobId) {
        self.active.retain(|c| c.job_id != job_id);
    }

    /// Erases every trace of a clip so it can be run again.
    pub fn forget(&mut self, job_id: ClipJobId) {
        self.deactivate(job_id);
        self.succeeded.retain(|c| c.job_id != job_id);
        self.failed.retain(|f| f.job_id != job_id);
        self.recount();
    }

    pub fn active_names(&self) -> Vec<&str> {
        self.active.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn succeeded_names(&self) -> Vec<&str> {
        self.succeeded.iter().map(|c| c.name.as_str()).collect()
    }

    fn recount(&mut self) {
        self.completed = self.succeeded.len() + self.failed.len();
    }
}

/// Progress state of one batch, as handed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRun {
    pub id: BatchId,
    pub jobs: Vec<ClipJob>,
    pub extract: PhaseProgress,
    pub align: PhaseProgress,
    pub assemble: PhaseProgress,
    pub rate_limit_countdown_secs: Option<u64>,
    pub finished: bool,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchRun {
    pub fn new(jobs: Vec<ClipJob>) -> Self {
        let total = jobs.len();
        Self {
            id: BatchId::new(),
            jobs,
            extract: PhaseProgress::with_total(total),
            align: PhaseProgress::with_total(total),
            assemble: PhaseProgress::with_total(total),
            rate_limit_countdown_secs: None,
            finished: false,
            finished_at: None,
        }
    }

    pub fn phase(&self, kind: PhaseKind) -> &PhaseProgress {
        match kind {
            PhaseKind::Extract => &self.extract,
            PhaseKind::Align => &self.align,
            PhaseKind::Assemble => &self.assemble,
        }
    }

    pub fn phase_mut(&mut self, kind: PhaseKind) -> &mut PhaseProgress {
        match kind {
            PhaseKind::Extract => &mut self.extract,
            PhaseKind::Align => &mut self.align,
            PhaseKind::Assemble => &mut self.assemble,
        }
    }

    pub fn job(&self, id: ClipJobId) -> Option<&ClipJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn job_mut(&mut self, id: ClipJobId) -> Option<&mut ClipJob> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }

    pub fn count_in(&self, phase: ClipPhase) -> usize {
        self.jobs.iter().filter(|j| j.phase == phase).count()
    }

    pub fn failed_ids(&self) -> Vec<ClipJobId> {
        self.jobs
            .iter()
            .filter(|j| j.phase == ClipPhase::Failed)
            .map(|j| j.id)
            .collect()
    }

    pub fn all_terminal(&self) -> bool {
        self.jobs.iter().all(|j| j.phase.is_terminal())
    }

    /// Sets `finished`, stamping the moment it first became true.
    pub fn mark_finished(&mut self, finished: bool) {
        self.finished = finished;
        self.finished_at = match (finished, self.finished_at) {
            (true, Some(at)) => Some(at),
            (true, None) => Some(Utc::now()),
            (false, _) => None,
        };
    }
}
