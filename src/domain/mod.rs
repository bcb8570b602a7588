mod batch_run;
mod clip_job;
mod clip_phase;
mod cut_points;
mod merge_request;
mod script_segment;
mod storage_path;
mod text_overlay;
mod transcript_word;

pub use batch_run::{BatchId, BatchRun, ClipRef, FailedClip, PhaseKind, PhaseProgress};
pub use clip_job::{ClipJob, ClipJobId};
pub use clip_phase::ClipPhase;
pub use cut_points::{CutPoints, TrimEdge, confidence};
pub use merge_request::MergeRequest;
pub use script_segment::{HighlightPosition, ScriptSegment, ScriptSegmentError};
pub use storage_path::{StoragePath, sanitize_segment};
pub use text_overlay::TextOverlay;
pub use transcript_word::TranscriptWord;
