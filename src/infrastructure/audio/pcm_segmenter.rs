use bytes::Bytes;

use crate::application::ports::{AudioSegmenter, SegmentationError};
use crate::domain::{AudioPayload, AudioSegment};

use super::audio_decoder::{TARGET_SAMPLE_RATE, decode_audio};
use super::wav_encoder::{encode_wav, wav_size};

/// Decodes the recording once and re-encodes fixed-length slices as WAV.
#[derive(Debug, Default, Clone, Copy)]
pub struct PcmSegmenter;

impl AudioSegmenter for PcmSegmenter {
    fn segment(
        &self,
        audio: &AudioPayload,
        segment_secs: u32,
    ) -> Result<Vec<AudioSegment>, SegmentationError> {
        if segment_secs == 0 {
            return Err(SegmentationError::InvalidDuration(segment_secs));
        }

        let extension = audio
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase());
        let decoded = decode_audio(&audio.data, extension.as_deref())?;

        let rate = decoded.sample_rate as f64;
        let frames_per_segment = decoded.sample_rate as usize * segment_secs as usize;
        let slices: Vec<&[f32]> = decoded.samples.chunks(frames_per_segment).collect();
        let total = slices.len();

        let mut segments = Vec::with_capacity(total);
        for (index, slice) in slices.into_iter().enumerate() {
            let start_frame = index * frames_per_segment;
            let wav = encode_wav(slice, decoded.sample_rate)?;
            segments.push(AudioSegment {
                index,
                total,
                start_secs: start_frame as f64 / rate,
                end_secs: (start_frame + slice.len()) as f64 / rate,
                data: Bytes::from(wav),
            });
        }

        tracing::debug!(
            segments = total,
            segment_secs,
            duration_secs = decoded.duration_secs(),
            "Recording segmented"
        );

        Ok(segments)
    }

    fn full_segment_bytes(&self, segment_secs: u32) -> Option<usize> {
        Some(wav_size(TARGET_SAMPLE_RATE as usize * segment_secs as usize))
    }
}
