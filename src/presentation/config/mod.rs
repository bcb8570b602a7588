mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AlignmentSettings, BatchConfigSettings, CleanupSettings, EncodeSettings, LoggingSettings,
    ServerSettings, Settings, StorageProviderSetting, StorageSettings, TranscriptionSettings,
};
