use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::ports::CleanupConfig;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub encode: EncodeSettings,
    pub transcription: TranscriptionSettings,
    pub cleanup: CleanupSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub batch: BatchConfigSettings,
    #[serde(default)]
    pub alignment: AlignmentSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Optional `appsettings.{env}` file, overridden by `APP_`-prefixed
    /// variables such as `APP_SERVER__PORT`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodeSettings {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "ro".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupSettings {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    #[serde(default)]
    pub options: CleanupConfig,
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_polls() -> u32 {
    60
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Bunny,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    /// Base of the public URLs handed out for stored media. For Bunny this is
    /// the pull zone URL.
    pub public_base_url: String,
    pub bunny_zone: Option<String>,
    pub bunny_access_key: Option<String>,
    pub bunny_storage_url: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::Local,
            local_path: "./media".to_string(),
            public_base_url: "http://localhost:3000/media".to_string(),
            bunny_zone: None,
            bunny_access_key: None,
            bunny_storage_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfigSettings {
    pub batch_size: usize,
    pub rate_limit_backoff_secs: u64,
    pub max_rate_limit_retries: u32,
    /// How long a finished batch stays queryable.
    pub retention_secs: u64,
}

impl Default for BatchConfigSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            rate_limit_backoff_secs: 65,
            max_rate_limit_retries: 3,
            retention_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlignmentSettings {
    pub margin_ms: u64,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self { margin_ms: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Unset means JSON in production, plain text elsewhere.
    pub enable_json: Option<bool>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,reelcut=debug,tower_http=debug".to_string(),
            enable_json: None,
        }
    }
}
