use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use bytes::Bytes;
use clap::Parser;

use audioscribe::application::services::{LogProgress, OrchestratorSettings, UploadOrchestrator};
use audioscribe::domain::{AudioMime, AudioPayload};
use audioscribe::infrastructure::audio::PcmSegmenter;
use audioscribe::infrastructure::gateway::HttpProcessingGateway;
use audioscribe::infrastructure::observability::{TracingConfig, init_tracing};
use audioscribe::presentation::config::DEFAULT_PROMPT;

const MIB: usize = 1024 * 1024;

#[derive(Parser)]
#[command(name = "audioscribe-client")]
#[command(about = "Upload an audio file to an audioscribe server and print the result", long_about = None)]
struct Cli {
    /// Audio file to upload (mp3, wav, ogg, webm or m4a)
    file: PathBuf,

    /// Base URL of the audioscribe server
    #[arg(long, env = "AUDIOSCRIBE_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Instruction sent to the model
    #[arg(long, env = "AUDIOSCRIBE_PROMPT")]
    prompt: Option<String>,

    /// Largest file accepted at all, in MiB
    #[arg(long, default_value_t = 90)]
    max_file_mib: usize,

    /// Largest file sent in one request, in MiB
    #[arg(long, default_value_t = 4)]
    direct_max_mib: usize,

    /// Largest packaged segment, in MiB
    #[arg(long, default_value_t = 4)]
    segment_max_mib: usize,

    /// Segment durations to try in order, in seconds
    #[arg(long, value_delimiter = ',', default_values_t = [300u32, 180, 60])]
    segment_secs: Vec<u32>,

    /// Segment requests in flight at once
    #[arg(long, default_value_t = 3)]
    window: usize,

    /// Chunk size for server-side reassembly, in MiB
    #[arg(long, default_value_t = 3)]
    chunk_mib: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(&TracingConfig::default())?;

    let cli = Cli::parse();

    let file_name = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no usable file name")?
        .to_string();
    let Some(mime) = AudioMime::resolve(None, &file_name) else {
        bail!("Unsupported file type: {}", file_name);
    };
    let data = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let audio = AudioPayload::new(Bytes::from(data), mime, file_name);
    tracing::info!(
        file_name = %audio.file_name,
        bytes = audio.size_bytes(),
        mime = %audio.mime.as_str(),
        server = %cli.server,
        "Uploading audio"
    );

    let gateway = Arc::new(HttpProcessingGateway::new(
        &cli.server,
        Duration::from_secs(cli.timeout_secs),
    )?);
    let settings = OrchestratorSettings {
        max_file_bytes: cli.max_file_mib * MIB,
        direct_max_bytes: cli.direct_max_mib * MIB,
        segment_max_bytes: cli.segment_max_mib * MIB,
        segment_durations_secs: cli.segment_secs,
        segment_window: cli.window,
        chunk_bytes: cli.chunk_mib * MIB,
    };
    let orchestrator = UploadOrchestrator::new(gateway, Arc::new(PcmSegmenter), settings);

    let prompt = cli.prompt.as_deref().unwrap_or(DEFAULT_PROMPT);
    let result = orchestrator.run(&audio, prompt, &LogProgress).await?;

    tracing::info!(
        strategy = %result.strategy,
        model = ?result.model,
        failed_segments = result.failed_segments,
        "Upload finished"
    );
    println!("{}", result.text);

    Ok(())
}
