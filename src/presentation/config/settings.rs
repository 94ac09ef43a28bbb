use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::domain::{DEFAULT_MODELS, EmptyCandidateList, ModelCandidates};

pub const DEFAULT_PROMPT: &str = "You are an audio processing expert. Transcribe the speech in this \
audio file as text, then write a summary of the content in English.";

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub gemini: GeminiSettings,
    pub limits: LimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub streaming: bool,
    pub request_timeout_secs: u64,
    pub default_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub max_chunk_bytes: usize,
    pub max_file_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            streaming: false,
            request_timeout_secs: 300,
            default_prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 4 * MIB,
            max_file_bytes: 90 * MIB,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,audioscribe=debug,tower_http=debug".to_string(),
            json: false,
        }
    }
}

impl GeminiSettings {
    pub fn candidates(&self) -> Result<ModelCandidates, EmptyCandidateList> {
        ModelCandidates::new(self.models.clone())
    }
}

impl Settings {
    /// Layers `appsettings.{env}.toml` (optional) under `APP_*` environment
    /// variables; `GEMINI_API_KEY` overrides the configured key.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .add_source(
                File::with_name(&environment.settings_file()).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gemini.models")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                settings.gemini.api_key = key.trim().to_string();
            }
        }

        Ok(settings)
    }
}
