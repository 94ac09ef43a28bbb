use async_trait::async_trait;

use crate::domain::{AudioPayload, AudioSegment, ChunkUpload, SessionId};

/// Server-side result of processing a whole file or a merged upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedText {
    pub text: String,
    pub model: Option<String>,
}

/// Reply to one chunk upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAck {
    pub complete: bool,
    pub received: usize,
    pub total: usize,
    pub result: Option<ProcessedText>,
}

/// The calls the client orchestrator makes against the processing server.
#[async_trait]
pub trait ProcessingGateway: Send + Sync {
    async fn submit_whole(
        &self,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<ProcessedText, GatewayError>;

    async fn submit_segment(
        &self,
        segment: &AudioSegment,
        prompt: &str,
    ) -> Result<String, GatewayError>;

    async fn upload_chunk(
        &self,
        chunk: &ChunkUpload,
        prompt: Option<&str>,
        process_immediately: bool,
    ) -> Result<ChunkAck, GatewayError>;

    async fn discard_session(&self, session_id: &SessionId) -> Result<(), GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("server returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
