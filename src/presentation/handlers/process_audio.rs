use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use super::error::ApiError;
use super::multipart_form::MultipartForm;
use super::upload_chunk::parse_session_id;
use crate::application::ports::GenerationClient;
use crate::application::services::ProcessingOutcome;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

/// Fields describing a processed file, shared by every endpoint that runs a
/// whole file through the models.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFields {
    pub result: String,
    pub model: String,
    pub file_name: String,
    pub file_size: usize,
    pub file_type: String,
}

impl From<ProcessingOutcome> for ProcessedFields {
    fn from(outcome: ProcessingOutcome) -> Self {
        Self {
            result: outcome.output.text,
            model: outcome.output.model,
            file_name: outcome.file_name,
            file_size: outcome.file_size,
            file_type: outcome.file_type,
        }
    }
}

#[derive(Serialize)]
pub struct ProcessAudioResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub processed: ProcessedFields,
}

impl ProcessAudioResponse {
    fn new(outcome: ProcessingOutcome) -> Self {
        Self {
            success: true,
            message: "Audio processed successfully".to_string(),
            processed: outcome.into(),
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn process_audio_handler<G>(
    State(state): State<AppState<G>>,
    multipart: Multipart,
) -> Result<Json<ProcessAudioResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let mut form = MultipartForm::read(multipart, "audio").await?;
    let audio = form.take_file("audio")?;
    let file_name = audio.file_name.unwrap_or_else(|| "audio".to_string());

    tracing::debug!(
        file_name = %file_name,
        content_type = ?audio.content_type,
        bytes = audio.data.len(),
        prompt = %sanitize_prompt(form.text("prompt").unwrap_or_default()),
        "Audio upload received"
    );

    let outcome = state
        .processing
        .process_file(
            audio.data,
            &file_name,
            audio.content_type.as_deref(),
            form.text("prompt"),
        )
        .await?;

    Ok(Json(ProcessAudioResponse::new(outcome)))
}

/// Runs a previously merged upload through the models.
#[tracing::instrument(skip(state, multipart))]
pub async fn process_session_handler<G>(
    State(state): State<AppState<G>>,
    multipart: Multipart,
) -> Result<Json<ProcessAudioResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let form = MultipartForm::read(multipart, "").await?;
    let session_id = parse_session_id(form.require("sessionId")?)?;

    let outcome = state
        .processing
        .process_session(&session_id, form.text("prompt"))
        .await?;

    Ok(Json(ProcessAudioResponse::new(outcome)))
}
