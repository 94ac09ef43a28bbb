use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::SegmentationError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_CHUNK: usize = 1024;

/// Mono PCM at `sample_rate`.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decodes any container symphonia can probe into 16 kHz mono PCM.
pub fn decode_audio(data: &[u8], extension: Option<&str>) -> Result<DecodedAudio, SegmentationError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SegmentationError::DecodingFailed(format!("probe: {}", e)))?;
    let mut format = probed.format;

    let (track_id, params) = {
        let track = format.default_track().ok_or_else(|| {
            SegmentationError::DecodingFailed("no audio track found".to_string())
        })?;
        (track.id, track.codec_params.clone())
    };

    let source_rate = params
        .sample_rate
        .ok_or_else(|| SegmentationError::DecodingFailed("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| SegmentationError::DecodingFailed(format!("codec: {}", e)))?;

    let mono = read_mono_samples(format.as_mut(), decoder.as_mut(), track_id, &params)?;
    if mono.is_empty() {
        return Err(SegmentationError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ));
    }

    let samples = if source_rate == TARGET_SAMPLE_RATE {
        mono
    } else {
        resample(&mono, source_rate, TARGET_SAMPLE_RATE)?
    };

    let decoded = DecodedAudio {
        samples,
        sample_rate: TARGET_SAMPLE_RATE,
    };

    tracing::debug!(
        source_rate,
        samples = decoded.samples.len(),
        duration_secs = decoded.duration_secs(),
        "Audio decoded to mono PCM"
    );

    Ok(decoded)
}

fn read_mono_samples(
    format: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
    params: &CodecParameters,
) -> Result<Vec<f32>, SegmentationError> {
    let channels = params.channels.map(|c| c.count()).unwrap_or(1).max(1);
    let mut mono = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(SegmentationError::DecodingFailed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(SegmentationError::DecodingFailed(format!("decode: {}", e)));
            }
        };

        if decoded.frames() == 0 {
            continue;
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);

        if channels == 1 {
            mono.extend_from_slice(buffer.samples());
        } else {
            mono.extend(
                buffer
                    .samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    Ok(mono)
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, SegmentationError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| SegmentationError::DecodingFailed(format!("resampler init: {}", e)))?;

    let expected_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(expected_len + RESAMPLE_CHUNK);

    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let mut input = chunk.to_vec();
        input.resize(RESAMPLE_CHUNK, 0.0);

        let frames = resampler
            .process(&[input], None)
            .map_err(|e| SegmentationError::DecodingFailed(format!("resample: {}", e)))?;

        if let Some(channel) = frames.first() {
            output.extend_from_slice(channel);
        }
    }

    output.truncate(expected_len);
    Ok(output)
}
