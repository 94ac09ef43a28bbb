use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hound::{SampleFormat, WavSpec, WavWriter};

use audioscribe::application::ports::{GatewayError, ProcessingGateway, SessionStore};
use audioscribe::application::services::{
    AudioProcessingService, ChunkReceiver, ModelFallback, OrchestratorSettings, ProgressEvent,
    Strategy, UploadOrchestrator,
};
use audioscribe::domain::{AudioMime, AudioPayload, AudioSegment, ChunkUpload, SessionId};
use audioscribe::infrastructure::audio::PcmSegmenter;
use audioscribe::infrastructure::gateway::HttpProcessingGateway;
use audioscribe::infrastructure::llm::MockGenerationClient;
use audioscribe::infrastructure::session::InMemorySessionStore;
use audioscribe::presentation::{AppState, ScaffoldConfig, Settings, create_router};

use crate::support::spawn_server;

async fn spawn_audioscribe() -> (String, Arc<InMemorySessionStore>) {
    let settings = Settings::default();
    let store = Arc::new(InMemorySessionStore::new());
    let sessions: Arc<dyn SessionStore> = store.clone();
    let state = AppState {
        chunk_receiver: Arc::new(ChunkReceiver::new(
            Arc::clone(&sessions),
            settings.limits.max_chunk_bytes,
            settings.limits.max_file_bytes,
        )),
        processing: Arc::new(AudioProcessingService::new(
            ModelFallback::new(
                Arc::new(MockGenerationClient::new(0)),
                settings.gemini.candidates().unwrap(),
            ),
            sessions,
            settings.limits.max_file_bytes,
            settings.gemini.default_prompt.clone(),
        )),
        settings,
        scaffold_config: ScaffoldConfig::disabled(),
    };
    (spawn_server(create_router(state)).await, store)
}

fn gateway(base: &str) -> Arc<HttpProcessingGateway> {
    Arc::new(HttpProcessingGateway::new(base, Duration::from_secs(10)).unwrap())
}

fn tone_wav(seconds: f32) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for n in 0..(16_000.0 * seconds) as usize {
            let sample = ((n as f32 / 16_000.0 * 330.0 * std::f32::consts::TAU).sin() * 6_000.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn payload(data: Vec<u8>, file_name: &str) -> AudioPayload {
    AudioPayload::new(
        Bytes::from(data),
        AudioMime::resolve(None, file_name).unwrap(),
        file_name,
    )
}

#[tokio::test]
async fn given_running_server_when_submitting_whole_file_then_result_and_model_parsed() {
    let (base, _) = spawn_audioscribe().await;

    let processed = gateway(&base)
        .submit_whole(&payload(b"ID3 data".to_vec(), "talk.mp3"), "Transcribe")
        .await
        .unwrap();

    assert!(processed.text.starts_with("Mock transcript from gemini-2.5-flash for talk.mp3"));
    assert_eq!(processed.model.as_deref(), Some("gemini-2.5-flash"));
}

#[tokio::test]
async fn given_segment_index_past_total_when_submitting_then_rejection_carries_status_and_message() {
    let (base, _) = spawn_audioscribe().await;
    let segment = AudioSegment {
        index: 5,
        total: 2,
        start_secs: 0.0,
        end_secs: 1.0,
        data: Bytes::from(tone_wav(0.1)),
    };

    let err = gateway(&base)
        .submit_segment(&segment, "Transcribe")
        .await
        .unwrap_err();

    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("segmentIndex"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn given_segment_when_submitting_then_text_returned() {
    let (base, _) = spawn_audioscribe().await;
    let segment = AudioSegment {
        index: 0,
        total: 2,
        start_secs: 0.0,
        end_secs: 1.0,
        data: Bytes::from(tone_wav(0.1)),
    };

    let text = gateway(&base)
        .submit_segment(&segment, "Transcribe")
        .await
        .unwrap();

    assert!(text.contains("segment_000.wav"));
    assert!(text.contains("audio/wav"));
}

#[tokio::test]
async fn given_chunks_when_uploading_then_last_ack_carries_result_and_session_is_gone() {
    let (base, store) = spawn_audioscribe().await;
    let gateway = gateway(&base);
    let session_id = SessionId::new();
    let chunk = |index: usize, data: &'static [u8]| ChunkUpload {
        session_id: session_id.clone(),
        index,
        total_chunks: 2,
        data: Bytes::from_static(data),
        file_name: "lecture.mp3".to_string(),
        mime_type: "audio/mpeg".to_string(),
    };

    let first = gateway.upload_chunk(&chunk(0, b"ID3"), None, false).await.unwrap();
    let last = gateway
        .upload_chunk(&chunk(1, b"more"), Some("Summarise"), true)
        .await
        .unwrap();

    assert!(!first.complete);
    assert!(first.result.is_none());
    assert!(last.complete);
    assert_eq!(last.received, 2);
    let result = last.result.unwrap();
    assert!(result.text.contains("(7 bytes, audio/mpeg)"), "{}", result.text);
    assert_eq!(result.model.as_deref(), Some("gemini-2.5-flash"));
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn given_partial_upload_when_discarding_then_server_drops_session() {
    let (base, store) = spawn_audioscribe().await;
    let gateway = gateway(&base);
    let session_id = SessionId::new();
    let chunk = ChunkUpload {
        session_id: session_id.clone(),
        index: 0,
        total_chunks: 3,
        data: Bytes::from_static(b"ID3"),
        file_name: "lecture.mp3".to_string(),
        mime_type: "audio/mpeg".to_string(),
    };
    gateway.upload_chunk(&chunk, None, false).await.unwrap();
    assert_eq!(store.len().await.unwrap(), 1);

    gateway.discard_session(&session_id).await.unwrap();

    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn given_wav_over_direct_limit_when_orchestrating_then_segmented_against_server() {
    let (base, _) = spawn_audioscribe().await;
    let settings = OrchestratorSettings {
        direct_max_bytes: 1024,
        segment_durations_secs: vec![1],
        ..OrchestratorSettings::default()
    };
    let orchestrator = UploadOrchestrator::new(gateway(&base), Arc::new(PcmSegmenter), settings);

    let result = orchestrator
        .run(&payload(tone_wav(2.5), "memo.wav"), "Transcribe", &|_: ProgressEvent| {})
        .await
        .unwrap();

    assert_eq!(result.strategy, Strategy::Segmented);
    assert_eq!(result.failed_segments, 0);
    let parts: Vec<&str> = result.text.split("\n\n").collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[0].contains("segment_000.wav"));
    assert!(parts[2].contains("segment_002.wav"));
}

#[tokio::test]
async fn given_undecodable_file_over_direct_limit_when_orchestrating_then_chunked_upload_succeeds() {
    let (base, store) = spawn_audioscribe().await;
    let settings = OrchestratorSettings {
        direct_max_bytes: 8,
        chunk_bytes: 10,
        ..OrchestratorSettings::default()
    };
    let orchestrator = UploadOrchestrator::new(gateway(&base), Arc::new(PcmSegmenter), settings);
    let audio = payload(b"not really an mp3 stream at all".to_vec(), "voice.mp3");

    let result = orchestrator
        .run(&audio, "Transcribe", &|_: ProgressEvent| {})
        .await
        .unwrap();

    assert_eq!(result.strategy, Strategy::Chunked);
    assert!(result.text.contains("voice.mp3 (31 bytes, audio/mpeg)"), "{}", result.text);
    assert_eq!(store.len().await.unwrap(), 0);
}
