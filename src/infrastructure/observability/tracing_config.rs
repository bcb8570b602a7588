/// Configuration for tracing initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

pub const DEFAULT_FILTER: &str = "info,reelcut=debug,tower_http=debug";

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}
