use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::multipart_form::MultipartForm;
use super::process_audio::ProcessedFields;
use crate::application::ports::GenerationClient;
use crate::domain::{ChunkUpload, SessionId};
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkResponse {
    pub success: bool,
    pub complete: bool,
    pub received: usize,
    pub total: usize,
    pub session_id: String,
    #[serde(flatten)]
    pub processed: Option<ProcessedFields>,
}

#[derive(Serialize)]
pub struct DiscardResponse {
    pub success: bool,
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_chunk_handler<G>(
    State(state): State<AppState<G>>,
    multipart: Multipart,
) -> Result<Json<UploadChunkResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let mut form = MultipartForm::read(multipart, "chunk").await?;

    let session_id = parse_session_id(form.require("sessionId")?)?;
    let index: usize = form
        .parse("chunkIndex")?
        .ok_or(ApiError::MissingField("chunkIndex"))?;
    let total: usize = form
        .parse("totalChunks")?
        .ok_or(ApiError::MissingField("totalChunks"))?;
    if total == 0 {
        return Err(ApiError::invalid("totalChunks", "must be greater than zero"));
    }
    if index >= total {
        return Err(ApiError::invalid(
            "chunkIndex",
            format!("{} out of range for {} chunks", index, total),
        ));
    }

    let chunk = form.take_file("chunk")?;
    let file_name = form
        .text("fileName")
        .map(str::to_string)
        .or(chunk.file_name)
        .unwrap_or_else(|| "audio".to_string());
    let mime_type = form
        .text("mimeType")
        .map(str::to_string)
        .or(chunk.content_type)
        .unwrap_or_default();

    tracing::debug!(
        session_id = %session_id,
        index,
        total,
        bytes = chunk.data.len(),
        "Chunk upload received"
    );

    let receipt = state
        .chunk_receiver
        .receive(ChunkUpload {
            session_id: session_id.clone(),
            index,
            total_chunks: total,
            data: chunk.data,
            file_name,
            mime_type,
        })
        .await?;

    let processed = if receipt.complete && form.flag("processImmediately") {
        let outcome = state
            .processing
            .process_session(&session_id, form.text("prompt"))
            .await?;
        Some(ProcessedFields::from(outcome))
    } else {
        None
    };

    Ok(Json(UploadChunkResponse {
        success: true,
        complete: receipt.complete,
        received: receipt.received,
        total: receipt.total,
        session_id: session_id.to_string(),
        processed,
    }))
}

/// Streams a merged upload back with its declared type as an attachment.
#[tracing::instrument(skip(state))]
pub async fn download_chunk_handler<G>(
    State(state): State<AppState<G>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let raw = query
        .session_id
        .as_deref()
        .ok_or(ApiError::MissingField("sessionId"))?;
    let session_id = parse_session_id(raw)?;

    let session = state.chunk_receiver.merged_session(&session_id).await?;
    let data = session
        .merged()
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("File not found or not complete: {}", session_id)))?;

    let content_type = HeaderValue::from_str(&session.mime_type)
        .ok()
        .filter(|_| !session.mime_type.is_empty())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        attachment_name(&session.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    tracing::info!(session_id = %session_id, bytes = data.len(), "Serving merged upload");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Deletes one session, or every session when no id is given.
#[tracing::instrument(skip(state))]
pub async fn discard_chunks_handler<G>(
    State(state): State<AppState<G>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<DiscardResponse>, ApiError>
where
    G: GenerationClient + 'static + ?Sized,
{
    let session_id = query
        .session_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_session_id)
        .transpose()?;

    let removed = state.chunk_receiver.discard(session_id.as_ref()).await?;

    Ok(Json(DiscardResponse {
        success: true,
        removed,
    }))
}

pub(super) fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(raw).map_err(|e| ApiError::invalid("sessionId", e.to_string()))
}

fn attachment_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect()
}
