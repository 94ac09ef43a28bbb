use bytes::Bytes;

use super::AudioMime;

/// Audio bytes ready to be sent to a generation model.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Bytes,
    pub mime: AudioMime,
    pub file_name: String,
}

impl AudioPayload {
    pub fn new(data: Bytes, mime: AudioMime, file_name: impl Into<String>) -> Self {
        Self {
            data,
            mime,
            file_name: file_name.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
