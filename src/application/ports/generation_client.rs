use async_trait::async_trait;

use crate::domain::AudioPayload;

/// One request to one named generative model.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<String, GenerationError>;

    /// Text-only request used to check whether a model answers at all.
    async fn probe(&self, model: &str) -> Result<(), GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("response text is empty")]
    EmptyResponse,
    #[error("api key not configured")]
    MissingApiKey,
}
