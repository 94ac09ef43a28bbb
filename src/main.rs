use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use audioscribe::application::ports::{GenerationClient, SessionStore};
use audioscribe::application::services::{AudioProcessingService, ChunkReceiver, ModelFallback};
use audioscribe::infrastructure::llm::{MockGenerationClient, create_gemini_client};
use audioscribe::infrastructure::observability::{TracingConfig, init_tracing};
use audioscribe::infrastructure::session::InMemorySessionStore;
use audioscribe::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging))?;
    tracing::info!(environment = %environment, "Configuration loaded");

    let scaffold_config = ScaffoldConfig::default();
    let client: Arc<dyn GenerationClient> = if scaffold_config.enabled {
        tracing::warn!(
            delay_ms = scaffold_config.mock_response_delay_ms,
            "Scaffold mode enabled, using canned model responses"
        );
        Arc::new(MockGenerationClient::new(
            scaffold_config.mock_response_delay_ms,
        ))
    } else {
        Arc::new(create_gemini_client(&settings.gemini)?)
    };

    let candidates = settings
        .gemini
        .candidates()
        .context("Invalid gemini.models")?;
    tracing::info!(models = ?candidates.iter().collect::<Vec<_>>(), "Model fallback order");

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let chunk_receiver = Arc::new(ChunkReceiver::new(
        Arc::clone(&sessions),
        settings.limits.max_chunk_bytes,
        settings.limits.max_file_bytes,
    ));
    let processing = Arc::new(AudioProcessingService::new(
        ModelFallback::new(client, candidates),
        sessions,
        settings.limits.max_file_bytes,
        settings.gemini.default_prompt.clone(),
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState {
        chunk_receiver,
        processing,
        settings,
        scaffold_config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
