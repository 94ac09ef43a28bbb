use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{GenerationError, SessionStoreError};
use crate::application::services::{ChunkError, FallbackError, ProcessingError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Every failure a handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    UnsupportedType(String),
    #[error("{0}")]
    NotFound(String),
    #[error("No model produced a response")]
    Upstream(String),
    #[error("API key not configured")]
    MissingCredential,
    #[error("Internal error")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::MissingCredential | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Upstream(details) | ApiError::Internal(details) => Some(details.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, details = ?self.details(), "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::InvalidChunk(e) => ApiError::invalid("chunk", e.to_string()),
            SessionStoreError::Unavailable(e) => ApiError::Internal(e),
        }
    }
}

impl From<FallbackError> for ApiError {
    fn from(err: FallbackError) -> Self {
        match err {
            FallbackError::AllModelsFailed {
                last_error: GenerationError::MissingApiKey,
                ..
            } => ApiError::MissingCredential,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ChunkError> for ApiError {
    fn from(err: ChunkError) -> Self {
        match err {
            e @ ChunkError::TooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            e @ ChunkError::TooManyChunks { .. } => ApiError::invalid("totalChunks", e.to_string()),
            e @ (ChunkError::NotFound(_) | ChunkError::Incomplete { .. }) => {
                ApiError::NotFound(format!("File not found or not complete: {}", e))
            }
            ChunkError::Store(e) => e.into(),
        }
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            e @ ProcessingError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            e @ ProcessingError::UnsupportedType(_) => ApiError::UnsupportedType(e.to_string()),
            e @ ProcessingError::InvalidSegment { .. } => ApiError::invalid("segmentIndex", e.to_string()),
            e @ (ProcessingError::SessionNotFound(_) | ProcessingError::SessionIncomplete { .. }) => {
                ApiError::NotFound(e.to_string())
            }
            ProcessingError::Fallback(e) => e.into(),
            ProcessingError::Store(e) => e.into(),
        }
    }
}
