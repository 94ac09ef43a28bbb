mod audio_segmenter;
mod generation_client;
mod processing_gateway;
mod session_store;

pub use audio_segmenter::{AudioSegmenter, SegmentationError};
pub use generation_client::{GenerationClient, GenerationError};
pub use processing_gateway::{ChunkAck, GatewayError, ProcessedText, ProcessingGateway};
pub use session_store::{SessionStore, SessionStoreError};
