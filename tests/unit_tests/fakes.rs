use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use audioscribe::application::ports::{
    AudioSegmenter, ChunkAck, GatewayError, GenerationClient, GenerationError, ProcessedText,
    ProcessingGateway, SegmentationError,
};
use audioscribe::domain::{AudioMime, AudioPayload, AudioSegment, ChunkUpload, SessionId};

pub fn mp3_payload(len: usize) -> AudioPayload {
    AudioPayload::new(
        Bytes::from(vec![7u8; len]),
        AudioMime::resolve(Some("audio/mpeg"), "talk.mp3").unwrap(),
        "talk.mp3",
    )
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Text(&'static str),
    Empty,
    Fail(&'static str),
    RateLimited,
    MissingKey,
}

/// Answers each model with a fixed reply and records every call.
pub struct ScriptedGenerationClient {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerationClient {
    pub fn new(replies: &[(&str, Reply)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(model, reply)| (model.to_string(), *reply))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    fn reply(&self, model: &str) -> Result<String, GenerationError> {
        match self.replies.get(model).copied() {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Empty) => Ok("   ".to_string()),
            Some(Reply::Fail(message)) => Err(GenerationError::ApiRequestFailed(message.to_string())),
            Some(Reply::RateLimited) => Err(GenerationError::RateLimited),
            Some(Reply::MissingKey) => Err(GenerationError::MissingApiKey),
            None => Err(GenerationError::ApiRequestFailed(format!(
                "HTTP 404: model {} not found",
                model
            ))),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    async fn generate(
        &self,
        model: &str,
        _audio: &AudioPayload,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.reply(model)
    }

    async fn probe(&self, model: &str) -> Result<(), GenerationError> {
        self.reply(model).map(|_| ())
    }
}

/// Server stand-in for the orchestrator. Tracks how many segment calls
/// overlap.
#[derive(Default)]
pub struct FakeGateway {
    whole_fails: bool,
    failing_segments: Vec<usize>,
    all_segments_fail: bool,
    chunk_without_result: bool,
    segment_delay_ms: u64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    log: Mutex<Vec<String>>,
    discarded: Mutex<Vec<SessionId>>,
}

impl FakeGateway {
    pub fn with_whole_failure(mut self) -> Self {
        self.whole_fails = true;
        self
    }

    pub fn with_failing_segments(mut self, indices: &[usize]) -> Self {
        self.failing_segments = indices.to_vec();
        self
    }

    pub fn with_all_segments_failing(mut self) -> Self {
        self.all_segments_fail = true;
        self
    }

    pub fn with_chunks_never_processed(mut self) -> Self {
        self.chunk_without_result = true;
        self
    }

    pub fn with_segment_delay(mut self, millis: u64) -> Self {
        self.segment_delay_ms = millis;
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn discarded(&self) -> Vec<SessionId> {
        self.discarded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessingGateway for FakeGateway {
    async fn submit_whole(
        &self,
        _audio: &AudioPayload,
        _prompt: &str,
    ) -> Result<ProcessedText, GatewayError> {
        self.log.lock().unwrap().push("whole".to_string());
        if self.whole_fails {
            return Err(GatewayError::Rejected {
                status: 413,
                message: "Request Entity Too Large".to_string(),
            });
        }
        Ok(ProcessedText {
            text: "direct transcript".to_string(),
            model: Some("gemini-2.5-flash".to_string()),
        })
    }

    async fn submit_segment(
        &self,
        segment: &AudioSegment,
        _prompt: &str,
    ) -> Result<String, GatewayError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(format!("segment:{}", segment.index));

        if self.segment_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.segment_delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.all_segments_fail || self.failing_segments.contains(&segment.index) {
            return Err(GatewayError::Rejected {
                status: 502,
                message: "No model produced a response".to_string(),
            });
        }
        Ok(format!("segment {}", segment.index))
    }

    async fn upload_chunk(
        &self,
        chunk: &ChunkUpload,
        _prompt: Option<&str>,
        process_immediately: bool,
    ) -> Result<ChunkAck, GatewayError> {
        self.log.lock().unwrap().push(format!(
            "chunk:{}:{}:{}",
            chunk.index,
            chunk.data.len(),
            process_immediately
        ));

        let complete = chunk.index + 1 == chunk.total_chunks;
        let result = (complete && process_immediately && !self.chunk_without_result).then(|| {
            ProcessedText {
                text: "chunked transcript".to_string(),
                model: Some("gemini-2.5-pro".to_string()),
            }
        });

        Ok(ChunkAck {
            complete,
            received: chunk.index + 1,
            total: chunk.total_chunks,
            result,
        })
    }

    async fn discard_session(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        self.discarded.lock().unwrap().push(session_id.clone());
        Ok(())
    }
}

/// Produces segments of preset byte sizes per duration.
#[derive(Default)]
pub struct FakeSegmenter {
    sizes: HashMap<u32, Vec<usize>>,
    full_sizes: HashMap<u32, usize>,
    undecodable: bool,
    requested: Mutex<Vec<u32>>,
}

impl FakeSegmenter {
    pub fn with_sizes(mut self, segment_secs: u32, sizes: &[usize]) -> Self {
        self.sizes.insert(segment_secs, sizes.to_vec());
        self
    }

    /// Announces the size of a full segment so the duration can be judged
    /// before segmenting.
    pub fn with_full_size(mut self, segment_secs: u32, bytes: usize) -> Self {
        self.full_sizes.insert(segment_secs, bytes);
        self
    }

    pub fn undecodable() -> Self {
        Self {
            undecodable: true,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

impl AudioSegmenter for FakeSegmenter {
    fn segment(
        &self,
        _audio: &AudioPayload,
        segment_secs: u32,
    ) -> Result<Vec<AudioSegment>, SegmentationError> {
        self.requested.lock().unwrap().push(segment_secs);
        if self.undecodable {
            return Err(SegmentationError::DecodingFailed(
                "no suitable decoder".to_string(),
            ));
        }

        let sizes = self.sizes.get(&segment_secs).cloned().unwrap_or_default();
        let total = sizes.len();
        Ok(sizes
            .into_iter()
            .enumerate()
            .map(|(index, size)| AudioSegment {
                index,
                total,
                start_secs: (index as u32 * segment_secs) as f64,
                end_secs: ((index as u32 + 1) * segment_secs) as f64,
                data: Bytes::from(vec![0u8; size]),
            })
            .collect())
    }

    fn full_segment_bytes(&self, segment_secs: u32) -> Option<usize> {
        self.full_sizes.get(&segment_secs).copied()
    }
}

/// A batch of `count` small segments.
pub fn segments(count: usize) -> Vec<AudioSegment> {
    (0..count)
        .map(|index| AudioSegment {
            index,
            total: count,
            start_secs: index as f64 * 60.0,
            end_secs: (index + 1) as f64 * 60.0,
            data: Bytes::from_static(b"RIFF"),
        })
        .collect()
}
