use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown APP_ENVIRONMENT '{0}', expected local, test or prod")]
pub struct UnknownEnvironment(pub String);

/// Deployment profile. Picks the settings file and the default log shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Test,
    Prod,
}

impl Environment {
    pub fn from_env() -> Result<Self, UnknownEnvironment> {
        std::env::var(ENVIRONMENT_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or(Ok(Self::Local), |v| v.parse())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }

    /// Base name of the optional TOML layer, e.g. `appsettings.prod`.
    pub fn settings_file(self) -> String {
        format!("appsettings.{}", self.name())
    }

    /// Log aggregation in prod expects one JSON object per line.
    pub fn json_logs_by_default(self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(UnknownEnvironment(raw.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = UnknownEnvironment;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
