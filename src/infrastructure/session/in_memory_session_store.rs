use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::ports::{SessionStore, SessionStoreError};
use crate::domain::{ChunkReceipt, ChunkUpload, SessionId, UploadSession};

/// Process-lifetime session map. Nothing survives a restart and nothing is
/// evicted except by `remove` or `clear`.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, UploadSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put_chunk(&self, chunk: ChunkUpload) -> Result<ChunkReceipt, SessionStoreError> {
        let mut sessions = self.sessions.write().await;

        let restart = sessions
            .get(&chunk.session_id)
            .is_none_or(UploadSession::is_complete);

        if restart {
            if sessions.contains_key(&chunk.session_id) {
                tracing::debug!(session_id = %chunk.session_id, "Restarting merged session");
            }
            let session = UploadSession::new(
                chunk.session_id.clone(),
                chunk.total_chunks,
                chunk.file_name.clone(),
                chunk.mime_type.clone(),
            )?;
            sessions.insert(chunk.session_id.clone(), session);
        }

        let session = sessions
            .get_mut(&chunk.session_id)
            .ok_or_else(|| SessionStoreError::Unavailable("session vanished".to_string()))?;

        let receipt = session.place_chunk(chunk.index, chunk.total_chunks, chunk.data)?;
        Ok(receipt)
    }

    async fn get(&self, id: &SessionId) -> Result<Option<UploadSession>, SessionStoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn clear(&self) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.len();
        sessions.clear();
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.sessions.read().await.len())
    }
}
