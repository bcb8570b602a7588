mod media_store;
mod media_transcoder;
mod transcription_engine;
mod voice_cleaner;

pub use media_store::{MediaStore, StorageError};
pub use media_transcoder::{EncodeSession, MediaTranscoder, TranscodeError, TrimRequest};
pub use transcription_engine::{Transcript, TranscriptionEngine, TranscriptionError};
pub use voice_cleaner::{CleanupConfig, CleanupEditId, CleanupError, CleanupStatus, VoiceCleaner};
