use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{GenerationClient, GenerationError};
use crate::domain::{AudioPayload, ModelCandidates, ModelOutput};

/// Tries each candidate model in order until one returns non-empty text.
pub struct ModelFallback<G: ?Sized>
where
    G: GenerationClient,
{
    client: Arc<G>,
    candidates: ModelCandidates,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelAvailability {
    pub model: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<G: ?Sized> ModelFallback<G>
where
    G: GenerationClient,
{
    pub fn new(client: Arc<G>, candidates: ModelCandidates) -> Self {
        Self { client, candidates }
    }

    pub fn candidates(&self) -> &ModelCandidates {
        &self.candidates
    }

    pub async fn invoke(
        &self,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<ModelOutput, FallbackError> {
        tracing::debug!(
            prompt_chars = prompt.len(),
            bytes = audio.size_bytes(),
            mime = %audio.mime.as_str(),
            "Starting model fallback"
        );

        let mut last_error = None;
        let mut attempts = 0;

        for model in self.candidates.iter() {
            attempts += 1;
            tracing::debug!(model = %model, attempt = attempts, "Trying model");

            match self.client.generate(model, audio, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(model = %model, chars = text.len(), "Model produced text");
                    return Ok(ModelOutput {
                        text,
                        model: model.to_string(),
                    });
                }
                Ok(_) => {
                    tracing::warn!(model = %model, "Model returned empty text");
                    last_error = Some(GenerationError::EmptyResponse);
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "Model failed");
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error.unwrap_or(GenerationError::EmptyResponse);
        tracing::error!(attempts, error = %last_error, "All candidate models failed");
        Err(FallbackError::AllModelsFailed {
            attempts,
            last_error,
        })
    }

    /// Best-effort availability check of every candidate.
    pub async fn probe_all(&self) -> Vec<ModelAvailability> {
        let mut results = Vec::with_capacity(self.candidates.len());
        for model in self.candidates.iter() {
            let availability = match self.client.probe(model).await {
                Ok(()) => ModelAvailability {
                    model: model.to_string(),
                    status: "available",
                    error: None,
                },
                Err(e) => ModelAvailability {
                    model: model.to_string(),
                    status: "unavailable",
                    error: Some(e.to_string()),
                },
            };
            results.push(availability);
        }
        results
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("no model produced a response after {attempts} attempts: {last_error}")]
    AllModelsFailed {
        attempts: usize,
        last_error: GenerationError,
    },
}
