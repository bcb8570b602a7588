mod alignment_strategies;
mod batch_coordinator;
mod clip_job_runner;
mod merge_engine;
mod speech_aligner;
mod text_normalizer;
mod voice_cleanup_service;

pub use alignment_strategies::{
    AlignmentContext, AlignmentLog, AlignmentStrategy, ExactWhiteText, HighlightBoundary,
    KeepEverything, KeepWindow, StrategyOutcome, WhiteBoundary, WholeHighlight, WordSpan,
    default_strategies,
};
pub use batch_coordinator::{
    BatchCoordinator, BatchError, BatchRunHandle, BatchSettings, DEFAULT_BATCH_SIZE,
    DEFAULT_MAX_RATE_LIMIT_RETRIES, DEFAULT_RATE_LIMIT_BACKOFF,
};
pub use clip_job_runner::{ClipJobError, ClipJobRunner, DEFAULT_LANGUAGE, JobOutcome, PhaseEvent};
pub use merge_engine::{MergeEngine, MergeError};
pub use speech_aligner::{
    Alignment, AlignmentError, AlignmentStatus, DEFAULT_MARGIN_MS, SpeechAligner,
};
pub use text_normalizer::{TranscriptToken, normalize_text, normalize_words, tokenize_transcript};
pub use voice_cleanup_service::{DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL, VoiceCleanupService};
