use std::sync::Arc;

use crate::application::ports::{SessionStore, SessionStoreError};
use crate::domain::{ChunkReceipt, ChunkUpload, SessionId, UploadSession};

/// Accepts size-bounded chunks into the session store.
pub struct ChunkReceiver {
    store: Arc<dyn SessionStore>,
    max_chunk_bytes: usize,
    max_total_chunks: usize,
}

impl ChunkReceiver {
    /// A session may declare at most as many chunks as it takes to carry
    /// `max_file_bytes` in `max_chunk_bytes` pieces.
    pub fn new(store: Arc<dyn SessionStore>, max_chunk_bytes: usize, max_file_bytes: usize) -> Self {
        Self {
            store,
            max_chunk_bytes,
            max_total_chunks: max_file_bytes.div_ceil(max_chunk_bytes.max(1)).max(1),
        }
    }

    pub async fn receive(&self, chunk: ChunkUpload) -> Result<ChunkReceipt, ChunkError> {
        if chunk.total_chunks > self.max_total_chunks {
            tracing::warn!(
                session_id = %chunk.session_id,
                total = chunk.total_chunks,
                max = self.max_total_chunks,
                "Rejecting chunk with oversized total"
            );
            return Err(ChunkError::TooManyChunks {
                total: chunk.total_chunks,
                max: self.max_total_chunks,
            });
        }

        let size = chunk.data.len();
        if size > self.max_chunk_bytes {
            tracing::warn!(
                session_id = %chunk.session_id,
                index = chunk.index,
                size,
                max = self.max_chunk_bytes,
                "Rejecting oversize chunk"
            );
            return Err(ChunkError::TooLarge {
                size,
                max: self.max_chunk_bytes,
            });
        }

        let session_id = chunk.session_id.clone();
        let index = chunk.index;
        let receipt = self.store.put_chunk(chunk).await?;

        tracing::debug!(
            session_id = %session_id,
            index,
            received = receipt.received,
            total = receipt.total,
            "Chunk stored"
        );

        if receipt.complete {
            tracing::info!(
                session_id = %session_id,
                chunks = receipt.total,
                bytes = receipt.merged_size.unwrap_or_default(),
                "All chunks received and merged"
            );
        }

        Ok(receipt)
    }

    /// Returns the session only once it has been merged.
    pub async fn merged_session(&self, id: &SessionId) -> Result<UploadSession, ChunkError> {
        match self.store.get(id).await? {
            Some(session) if session.is_complete() => Ok(session),
            Some(session) => Err(ChunkError::Incomplete {
                received: session.received(),
                total: session.total_chunks,
            }),
            None => Err(ChunkError::NotFound(id.to_string())),
        }
    }

    /// Removes one session, or every session when `id` is `None`.
    pub async fn discard(&self, id: Option<&SessionId>) -> Result<usize, ChunkError> {
        let removed = match id {
            Some(id) => usize::from(self.store.remove(id).await?),
            None => self.store.clear().await?,
        };
        tracing::info!(session_id = ?id.map(SessionId::as_str), removed, "Upload sessions discarded");
        Ok(removed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error(
        "Chunk size too large: {:.2}MB (max: {:.0}MB)",
        megabytes(.size),
        megabytes(.max)
    )]
    TooLarge { size: usize, max: usize },
    #[error("{total} chunks exceed the limit of {max} per file")]
    TooManyChunks { total: usize, max: usize },
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("file not complete: {received} of {total} chunks received")]
    Incomplete { received: usize, total: usize },
    #[error("session store: {0}")]
    Store(#[from] SessionStoreError),
}

pub(crate) fn megabytes(bytes: &usize) -> f64 {
    *bytes as f64 / 1024.0 / 1024.0
}
