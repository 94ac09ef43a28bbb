use std::sync::Arc;

use crate::application::ports::{AudioSegmenter, ProcessingGateway};
use crate::application::services::chunk_receiver::megabytes;
use crate::application::services::{ProgressEvent, ProgressSink, SegmentDispatcher, Strategy};
use crate::domain::{AudioPayload, ChunkUpload, SessionId, merge_segment_outcomes};

/// Size thresholds and step-downs for the client-side strategies.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_file_bytes: usize,
    pub direct_max_bytes: usize,
    pub segment_max_bytes: usize,
    pub segment_durations_secs: Vec<u32>,
    pub segment_window: usize,
    pub chunk_bytes: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 90 * 1024 * 1024,
            direct_max_bytes: 4 * 1024 * 1024,
            segment_max_bytes: 4 * 1024 * 1024,
            segment_durations_secs: vec![300, 180, 60],
            segment_window: 3,
            chunk_bytes: 3 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationResult {
    pub text: String,
    pub strategy: Strategy,
    pub model: Option<String>,
    pub failed_segments: usize,
}

/// Client-side driver: direct upload, then segmented, then chunked, moving
/// on only when the current strategy fails.
pub struct UploadOrchestrator<P: ?Sized, S: ?Sized>
where
    P: ProcessingGateway,
    S: AudioSegmenter,
{
    gateway: Arc<P>,
    segmenter: Arc<S>,
    settings: OrchestratorSettings,
}

impl<P: ?Sized, S: ?Sized> UploadOrchestrator<P, S>
where
    P: ProcessingGateway + 'static,
    S: AudioSegmenter + 'static,
{
    pub fn new(gateway: Arc<P>, segmenter: Arc<S>, settings: OrchestratorSettings) -> Self {
        Self {
            gateway,
            segmenter,
            settings,
        }
    }

    pub async fn run(
        &self,
        audio: &AudioPayload,
        prompt: &str,
        progress: &dyn ProgressSink,
    ) -> Result<OrchestrationResult, OrchestratorError> {
        if audio.size_bytes() > self.settings.max_file_bytes {
            return Err(OrchestratorError::FileTooLarge {
                size: audio.size_bytes(),
                max: self.settings.max_file_bytes,
            });
        }

        let mut failures = Vec::new();

        for strategy in [Strategy::Direct, Strategy::Segmented, Strategy::Chunked] {
            progress.report(ProgressEvent::StrategyStarted(strategy));

            let attempt = match strategy {
                Strategy::Direct => self.run_direct(audio, prompt).await,
                Strategy::Segmented => self.run_segmented(audio, prompt, progress).await,
                Strategy::Chunked => self.run_chunked(audio, prompt, progress).await,
            };

            match attempt {
                Ok(result) => return Ok(result),
                Err(reason) => {
                    progress.report(ProgressEvent::StrategyFailed {
                        strategy,
                        reason: reason.clone(),
                    });
                    failures.push((strategy, reason));
                }
            }
        }

        Err(OrchestratorError::AllStrategiesFailed(failures))
    }

    async fn run_direct(
        &self,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<OrchestrationResult, String> {
        if audio.size_bytes() > self.settings.direct_max_bytes {
            return Err(format!(
                "file of {} bytes exceeds direct limit of {} bytes",
                audio.size_bytes(),
                self.settings.direct_max_bytes
            ));
        }

        let processed = self
            .gateway
            .submit_whole(audio, prompt)
            .await
            .map_err(|e| e.to_string())?;

        Ok(OrchestrationResult {
            text: processed.text,
            strategy: Strategy::Direct,
            model: processed.model,
            failed_segments: 0,
        })
    }

    async fn run_segmented(
        &self,
        audio: &AudioPayload,
        prompt: &str,
        progress: &dyn ProgressSink,
    ) -> Result<OrchestrationResult, String> {
        let dispatcher = SegmentDispatcher::new(
            Arc::clone(&self.gateway),
            self.settings.segment_window,
        );
        let mut last_reason = "no segment durations configured".to_string();

        for &segment_secs in &self.settings.segment_durations_secs {
            if let Some(bytes) = self.segmenter.full_segment_bytes(segment_secs) {
                if bytes > self.settings.segment_max_bytes {
                    tracing::debug!(
                        segment_secs,
                        bytes,
                        max = self.settings.segment_max_bytes,
                        "Skipping segment duration that cannot fit"
                    );
                    last_reason = format!(
                        "{}s segments need {} bytes (max {})",
                        segment_secs, bytes, self.settings.segment_max_bytes
                    );
                    continue;
                }
            }

            let segmenter = Arc::clone(&self.segmenter);
            let source = audio.clone();
            let segments =
                tokio::task::spawn_blocking(move || segmenter.segment(&source, segment_secs))
                    .await
                    .map_err(|e| format!("segmentation task failed: {}", e))?
                    .map_err(|e| e.to_string())?;

            if segments.is_empty() {
                return Err("audio produced no segments".to_string());
            }

            if let Some(largest) = segments.iter().map(|s| s.data.len()).max() {
                if largest > self.settings.segment_max_bytes {
                    tracing::debug!(
                        segment_secs,
                        largest,
                        max = self.settings.segment_max_bytes,
                        "Segments too large, stepping down duration"
                    );
                    last_reason = format!(
                        "{}s segments reach {} bytes (max {})",
                        segment_secs, largest, self.settings.segment_max_bytes
                    );
                    continue;
                }
            }

            progress.report(ProgressEvent::SegmentsPrepared {
                count: segments.len(),
                segment_secs,
            });

            let outcomes = dispatcher.dispatch(&segments, prompt, progress).await;
            let failed_segments = outcomes.iter().filter(|o| o.is_failure()).count();

            if failed_segments == outcomes.len() {
                last_reason = format!("all {} segments of {}s failed", outcomes.len(), segment_secs);
                continue;
            }

            return Ok(OrchestrationResult {
                text: merge_segment_outcomes(&outcomes),
                strategy: Strategy::Segmented,
                model: None,
                failed_segments,
            });
        }

        Err(last_reason)
    }

    async fn run_chunked(
        &self,
        audio: &AudioPayload,
        prompt: &str,
        progress: &dyn ProgressSink,
    ) -> Result<OrchestrationResult, String> {
        if audio.data.is_empty() {
            return Err("file is empty".to_string());
        }

        let chunk_bytes = self.settings.chunk_bytes.max(1);
        let total_chunks = audio.data.len().div_ceil(chunk_bytes);
        let session_id = SessionId::new();

        for index in 0..total_chunks {
            let start = index * chunk_bytes;
            let end = (start + chunk_bytes).min(audio.data.len());
            let is_last = index + 1 == total_chunks;

            let chunk = ChunkUpload {
                session_id: session_id.clone(),
                index,
                total_chunks,
                data: audio.data.slice(start..end),
                file_name: audio.file_name.clone(),
                mime_type: audio.mime.as_str().to_string(),
            };

            let ack = match self
                .gateway
                .upload_chunk(&chunk, is_last.then_some(prompt), is_last)
                .await
            {
                Ok(ack) => ack,
                Err(e) => {
                    self.discard(&session_id).await;
                    return Err(format!("chunk {}/{}: {}", index + 1, total_chunks, e));
                }
            };

            progress.report(ProgressEvent::ChunkUploaded {
                received: ack.received,
                total: ack.total,
            });

            if is_last {
                return match ack.result {
                    Some(processed) => Ok(OrchestrationResult {
                        text: processed.text,
                        strategy: Strategy::Chunked,
                        model: processed.model,
                        failed_segments: 0,
                    }),
                    None => {
                        self.discard(&session_id).await;
                        Err(format!(
                            "server did not return a result (complete: {})",
                            ack.complete
                        ))
                    }
                };
            }
        }

        Err("no chunks were uploaded".to_string())
    }

    async fn discard(&self, session_id: &SessionId) {
        if let Err(e) = self.gateway.discard_session(session_id).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to discard upload session");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(
        "File too large: {:.2}MB (max: {:.0}MB)",
        megabytes(.size),
        megabytes(.max)
    )]
    FileTooLarge { size: usize, max: usize },
    #[error("all upload strategies failed: {}", describe_failures(.0))]
    AllStrategiesFailed(Vec<(Strategy, String)>),
}

fn describe_failures(failures: &[(Strategy, String)]) -> String {
    failures
        .iter()
        .map(|(strategy, reason)| format!("{}: {}", strategy, reason))
        .collect::<Vec<_>>()
        .join("; ")
}
