use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::SegmentationError;

/// Packages mono f32 PCM as a 16-bit WAV file in memory.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, SegmentationError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| SegmentationError::EncodingFailed(e.to_string()))?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(clamped)
                .map_err(|e| SegmentationError::EncodingFailed(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| SegmentationError::EncodingFailed(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Size of the WAV `encode_wav` would produce for `frames` mono samples.
pub fn wav_size(frames: usize) -> usize {
    44 + frames * 2
}
