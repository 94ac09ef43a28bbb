use bytes::{Bytes, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};

use super::SessionId;

/// One chunk as received from the client.
#[derive(Debug, Clone)]
pub struct ChunkUpload {
    pub session_id: SessionId,
    pub index: usize,
    pub total_chunks: usize,
    pub data: Bytes,
    pub file_name: String,
    pub mime_type: String,
}

/// Progress of a session after a chunk has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReceipt {
    pub session_id: SessionId,
    pub received: usize,
    pub total: usize,
    pub complete: bool,
    pub merged_size: Option<usize>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChunkPlacementError {
    #[error("totalChunks must be greater than zero")]
    ZeroTotal,
    #[error("chunkIndex {index} out of range for {total} chunks")]
    IndexOutOfRange { index: usize, total: usize },
    #[error("totalChunks {declared} does not match session total {expected}")]
    TotalMismatch { declared: usize, expected: usize },
}

#[derive(Debug, Clone)]
enum SessionContent {
    Collecting(Vec<Option<Bytes>>),
    Merged(Bytes),
}

/// Transient accumulation of the chunks of one uploaded file.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub id: SessionId,
    pub total_chunks: usize,
    pub file_name: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    content: SessionContent,
}

impl UploadSession {
    pub fn new(
        id: SessionId,
        total_chunks: usize,
        file_name: String,
        mime_type: String,
    ) -> Result<Self, ChunkPlacementError> {
        if total_chunks == 0 {
            return Err(ChunkPlacementError::ZeroTotal);
        }
        Ok(Self {
            id,
            total_chunks,
            file_name,
            mime_type,
            created_at: Utc::now(),
            content: SessionContent::Collecting(vec![None; total_chunks]),
        })
    }

    /// Writes `data` at `index`, overwriting whatever was there. Collapses the
    /// session into one buffer once every position is filled.
    pub fn place_chunk(
        &mut self,
        index: usize,
        declared_total: usize,
        data: Bytes,
    ) -> Result<ChunkReceipt, ChunkPlacementError> {
        if declared_total != self.total_chunks {
            return Err(ChunkPlacementError::TotalMismatch {
                declared: declared_total,
                expected: self.total_chunks,
            });
        }
        if index >= self.total_chunks {
            return Err(ChunkPlacementError::IndexOutOfRange {
                index,
                total: self.total_chunks,
            });
        }

        if let SessionContent::Collecting(slots) = &mut self.content {
            slots[index] = Some(data);
            if slots.iter().all(Option::is_some) {
                let merged = concat_slots(slots);
                self.content = SessionContent::Merged(merged);
            }
        }

        Ok(self.receipt())
    }

    pub fn received(&self) -> usize {
        match &self.content {
            SessionContent::Collecting(slots) => slots.iter().filter(|s| s.is_some()).count(),
            SessionContent::Merged(_) => self.total_chunks,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.content, SessionContent::Merged(_))
    }

    pub fn merged(&self) -> Option<&Bytes> {
        match &self.content {
            SessionContent::Merged(data) => Some(data),
            SessionContent::Collecting(_) => None,
        }
    }

    /// Time since the first chunk arrived.
    pub fn age(&self) -> TimeDelta {
        Utc::now() - self.created_at
    }

    pub fn receipt(&self) -> ChunkReceipt {
        ChunkReceipt {
            session_id: self.id.clone(),
            received: self.received(),
            total: self.total_chunks,
            complete: self.is_complete(),
            merged_size: self.merged().map(Bytes::len),
        }
    }
}

fn concat_slots(slots: &[Option<Bytes>]) -> Bytes {
    let size = slots.iter().flatten().map(Bytes::len).sum();
    let mut buffer = BytesMut::with_capacity(size);
    for slot in slots.iter().flatten() {
        buffer.extend_from_slice(slot);
    }
    buffer.freeze()
}
