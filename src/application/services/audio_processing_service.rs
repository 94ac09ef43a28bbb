use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{GenerationClient, SessionStore, SessionStoreError};
use crate::application::services::chunk_receiver::megabytes;
use crate::application::services::{FallbackError, ModelFallback};
use crate::domain::{AudioMime, AudioPayload, ModelOutput, SessionId, segment_prompt};

/// Result of processing a complete audio file.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub output: ModelOutput,
    pub file_name: String,
    pub file_size: usize,
    pub file_type: String,
}

/// Turns whole files, single segments and merged uploads into model text.
pub struct AudioProcessingService<G: ?Sized>
where
    G: GenerationClient,
{
    fallback: ModelFallback<G>,
    sessions: Arc<dyn SessionStore>,
    max_file_bytes: usize,
    default_prompt: String,
}

impl<G: ?Sized> AudioProcessingService<G>
where
    G: GenerationClient,
{
    pub fn new(
        fallback: ModelFallback<G>,
        sessions: Arc<dyn SessionStore>,
        max_file_bytes: usize,
        default_prompt: String,
    ) -> Self {
        Self {
            fallback,
            sessions,
            max_file_bytes,
            default_prompt,
        }
    }

    pub fn fallback(&self) -> &ModelFallback<G> {
        &self.fallback
    }

    pub async fn process_file(
        &self,
        data: Bytes,
        file_name: &str,
        declared_mime: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        let payload = self.validate(data, file_name, declared_mime)?;
        let prompt = self.prompt_or_default(prompt);

        let output = self.fallback.invoke(&payload, prompt).await?;

        tracing::info!(
            file_name = %payload.file_name,
            bytes = payload.size_bytes(),
            model = %output.model,
            "Audio file processed"
        );

        Ok(ProcessingOutcome {
            output,
            file_size: payload.size_bytes(),
            file_type: payload.mime.as_str().to_string(),
            file_name: payload.file_name,
        })
    }

    pub async fn process_segment(
        &self,
        data: Bytes,
        file_name: &str,
        declared_mime: Option<&str>,
        prompt: &str,
        index: usize,
        total: usize,
    ) -> Result<ModelOutput, ProcessingError> {
        if total == 0 || index >= total {
            return Err(ProcessingError::InvalidSegment { index, total });
        }

        let payload = self.validate(data, file_name, declared_mime)?;
        let prompt = segment_prompt(prompt, index, total);

        let output = self.fallback.invoke(&payload, &prompt).await?;

        tracing::info!(
            segment = index + 1,
            total,
            model = %output.model,
            chars = output.text.len(),
            "Segment processed"
        );

        Ok(output)
    }

    /// Processes a merged upload and drops it once a model has answered.
    /// A failed run keeps the session so the client can retry.
    pub async fn process_session(
        &self,
        id: &SessionId,
        prompt: Option<&str>,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        let session = self
            .sessions
            .get(id)
            .await?
            .ok_or_else(|| ProcessingError::SessionNotFound(id.to_string()))?;

        let data = session
            .merged()
            .cloned()
            .ok_or_else(|| ProcessingError::SessionIncomplete {
                received: session.received(),
                total: session.total_chunks,
            })?;
        if data.len() > self.max_file_bytes {
            return Err(ProcessingError::PayloadTooLarge {
                size: data.len(),
                max: self.max_file_bytes,
            });
        }

        let mime = AudioMime::resolve(Some(&session.mime_type), &session.file_name)
            .ok_or_else(|| ProcessingError::UnsupportedType(session.mime_type.clone()))?;
        let payload = AudioPayload::new(data, mime, session.file_name.clone());
        let prompt = self.prompt_or_default(prompt);

        let output = self.fallback.invoke(&payload, prompt).await?;

        if let Err(e) = self.sessions.remove(id).await {
            tracing::warn!(session_id = %id, error = %e, "Failed to delete processed session");
        }

        tracing::info!(
            session_id = %id,
            bytes = payload.size_bytes(),
            upload_age_secs = session.age().num_seconds(),
            model = %output.model,
            "Merged upload processed"
        );

        Ok(ProcessingOutcome {
            output,
            file_size: payload.size_bytes(),
            file_type: payload.mime.as_str().to_string(),
            file_name: payload.file_name,
        })
    }

    fn validate(
        &self,
        data: Bytes,
        file_name: &str,
        declared_mime: Option<&str>,
    ) -> Result<AudioPayload, ProcessingError> {
        if data.len() > self.max_file_bytes {
            return Err(ProcessingError::PayloadTooLarge {
                size: data.len(),
                max: self.max_file_bytes,
            });
        }

        let mime = AudioMime::resolve(declared_mime, file_name).ok_or_else(|| {
            ProcessingError::UnsupportedType(declared_mime.unwrap_or("unknown").to_string())
        })?;

        Ok(AudioPayload::new(data, mime, file_name))
    }

    fn prompt_or_default<'a>(&'a self, prompt: Option<&'a str>) -> &'a str {
        prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.default_prompt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(
        "File too large: {:.2}MB (max: {:.0}MB)",
        megabytes(.size),
        megabytes(.max)
    )]
    PayloadTooLarge { size: usize, max: usize },
    #[error("Unsupported file type: {0}. Upload MP3, WAV, OGG, WebM or M4A audio")]
    UnsupportedType(String),
    #[error("segmentIndex {index} out of range for {total} segments")]
    InvalidSegment { index: usize, total: usize },
    #[error("File not found or not complete: {0}")]
    SessionNotFound(String),
    #[error("File not complete: {received} of {total} chunks received")]
    SessionIncomplete { received: usize, total: usize },
    #[error("{0}")]
    Fallback(#[from] FallbackError),
    #[error("session store: {0}")]
    Store(#[from] SessionStoreError),
}
