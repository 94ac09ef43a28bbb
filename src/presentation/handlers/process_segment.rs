use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use super::error::ApiError;
use super::multipart_form::MultipartForm;
use crate::application::ports::GenerationClient;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSegmentResponse {
    pub success: bool,
    pub text: String,
    pub model: String,
    pub segment_index: usize,
    pub total_segments: usize,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn process_segment_handler<G>(
    State(state): State<AppState<G>>,
    multipart: Multipart,
) -> Result<Json<ProcessSegmentResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let mut form = MultipartForm::read(multipart, "audio").await?;
    let audio = form.take_file("audio")?;
    let prompt = form.require("prompt")?.to_string();
    let segment_index: usize = form.parse("segmentIndex")?.unwrap_or(0);
    let total_segments: usize = form.parse("totalSegments")?.unwrap_or(1);
    let file_name = audio
        .file_name
        .unwrap_or_else(|| format!("segment_{:03}.wav", segment_index));

    tracing::debug!(
        segment_index,
        total_segments,
        bytes = audio.data.len(),
        prompt = %sanitize_prompt(&prompt),
        "Segment upload received"
    );

    let output = state
        .processing
        .process_segment(
            audio.data,
            &file_name,
            audio.content_type.as_deref(),
            &prompt,
            segment_index,
            total_segments,
        )
        .await?;

    Ok(Json(ProcessSegmentResponse {
        success: true,
        text: output.text,
        model: output.model,
        segment_index,
        total_segments,
    }))
}
