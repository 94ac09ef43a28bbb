mod error;
mod health;
mod models;
mod multipart_form;
mod process_audio;
mod process_segment;
mod upload_chunk;

pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use models::models_handler;
pub use process_audio::{process_audio_handler, process_session_handler};
pub use process_segment::process_segment_handler;
pub use upload_chunk::{discard_chunks_handler, download_chunk_handler, upload_chunk_handler};
