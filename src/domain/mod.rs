mod audio_mime;
mod audio_payload;
mod audio_segment;
mod model_candidates;
mod session_id;
mod upload_session;

pub use audio_mime::{ACCEPTED_AUDIO_MIMES, AudioMime};
pub use audio_payload::AudioPayload;
pub use audio_segment::{AudioSegment, SegmentOutcome, merge_segment_outcomes, segment_prompt};
pub use model_candidates::{DEFAULT_MODELS, EmptyCandidateList, ModelCandidates, ModelOutput};
pub use session_id::{InvalidSessionId, SessionId};
pub use upload_session::{ChunkPlacementError, ChunkReceipt, ChunkUpload, UploadSession};
