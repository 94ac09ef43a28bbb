mod audio_processing_service;
mod chunk_receiver;
mod model_fallback;
mod progress;
mod segment_dispatcher;
mod upload_orchestrator;

pub use audio_processing_service::{AudioProcessingService, ProcessingError, ProcessingOutcome};
pub use chunk_receiver::{ChunkError, ChunkReceiver};
pub use model_fallback::{FallbackError, ModelAvailability, ModelFallback};
pub use progress::{LogProgress, ProgressEvent, ProgressSink, Strategy};
pub use segment_dispatcher::SegmentDispatcher;
pub use upload_orchestrator::{
    OrchestrationResult, OrchestratorError, OrchestratorSettings, UploadOrchestrator,
};
