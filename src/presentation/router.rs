use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::GenerationClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    discard_chunks_handler, download_chunk_handler, health_handler, models_handler,
    process_audio_handler, process_segment_handler, process_session_handler,
    upload_chunk_handler,
};
use crate::presentation::state::AppState;

/// Headroom for multipart boundaries and text fields on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_router<G>(state: AppState<G>) -> Router
where
    G: GenerationClient + 'static + ?Sized,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = state.settings.limits.max_file_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/upload-chunk",
            post(upload_chunk_handler::<G>)
                .get(download_chunk_handler::<G>)
                .delete(discard_chunks_handler::<G>),
        )
        .route("/api/process-session", post(process_session_handler::<G>))
        .route("/api/process-audio", post(process_audio_handler::<G>))
        .route("/api/remove-voice", post(process_audio_handler::<G>))
        .route("/api/process-segment", post(process_segment_handler::<G>))
        .route("/api/models", get(models_handler::<G>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
