use crate::domain::{ChunkPlacementError, ChunkReceipt, ChunkUpload, SessionId, UploadSession};

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes one chunk, creating the session on its first chunk.
    async fn put_chunk(&self, chunk: ChunkUpload) -> Result<ChunkReceipt, SessionStoreError>;

    async fn get(&self, id: &SessionId) -> Result<Option<UploadSession>, SessionStoreError>;

    async fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Drops every session and returns how many were removed.
    async fn clear(&self) -> Result<usize, SessionStoreError>;

    async fn len(&self) -> Result<usize, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("invalid chunk: {0}")]
    InvalidChunk(#[from] ChunkPlacementError),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
