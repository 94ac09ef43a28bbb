mod environment;
mod scaffold_config;
mod settings;

pub use environment::{Environment, UnknownEnvironment};
pub use scaffold_config::ScaffoldConfig;
pub use settings::{
    DEFAULT_PROMPT, GeminiSettings, LimitSettings, LoggingSettings, ServerSettings, Settings,
};
