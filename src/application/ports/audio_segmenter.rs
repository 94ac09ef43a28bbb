use crate::domain::{AudioPayload, AudioSegment};

/// Cuts a recording into independently playable segments.
pub trait AudioSegmenter: Send + Sync {
    fn segment(
        &self,
        audio: &AudioPayload,
        segment_secs: u32,
    ) -> Result<Vec<AudioSegment>, SegmentationError>;

    /// Encoded size of a full `segment_secs` segment, when it is known
    /// without decoding the recording.
    fn full_segment_bytes(&self, _segment_secs: u32) -> Option<usize> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("audio encoding failed: {0}")]
    EncodingFailed(String),
    #[error("invalid segment duration: {0}")]
    InvalidDuration(u32),
}
