use std::fmt;
use std::str::FromStr;

/// Deployment the service runs in. Picks the `appsettings.{env}` file and the
/// log format default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Production ships JSON logs unless told otherwise.
    pub fn prefers_json_logs(&self) -> bool {
        matches!(self, Environment::Prod)
    }

    /// Reads `APP_ENVIRONMENT`, falling back to `Local` when unset.
    pub fn from_env() -> Result<Self, String> {
        match std::env::var("APP_ENVIRONMENT") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::default()),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(format!(
                "unknown environment {:?}, expected local, test or prod",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
