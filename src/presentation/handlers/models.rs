use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::error::ApiError;
use crate::application::ports::GenerationClient;
use crate::application::services::ModelAvailability;
use crate::presentation::state::AppState;

const KEY_PREFIX_CHARS: usize = 10;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Vec<ModelAvailability>,
    pub api_key: String,
}

/// Probes every configured model with a tiny prompt.
#[tracing::instrument(skip(state))]
pub async fn models_handler<G>(
    State(state): State<AppState<G>>,
) -> Result<Json<ModelsResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let api_key = if state.scaffold_config.enabled {
        "scaffold".to_string()
    } else {
        let key = state.settings.gemini.api_key.trim();
        if key.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        masked_key(key)
    };

    let models = state.processing.fallback().probe_all().await;
    let available = models.iter().filter(|m| m.error.is_none()).count();
    tracing::info!(probed = models.len(), available, "Model probe finished");

    Ok(Json(ModelsResponse {
        success: true,
        models,
        api_key,
    }))
}

fn masked_key(key: &str) -> String {
    let prefix: String = key.chars().take(KEY_PREFIX_CHARS).collect();
    format!("{}...", prefix)
}
