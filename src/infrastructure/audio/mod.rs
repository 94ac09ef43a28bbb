pub mod audio_decoder;
mod pcm_segmenter;
pub mod wav_encoder;

pub use pcm_segmenter::PcmSegmenter;
