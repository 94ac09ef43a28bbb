use std::fmt;

/// Upload strategies in the order the orchestrator attempts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Segmented,
    Chunked,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Segmented => "segmented",
            Strategy::Chunked => "chunked",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    StrategyStarted(Strategy),
    StrategyFailed { strategy: Strategy, reason: String },
    SegmentsPrepared { count: usize, segment_secs: u32 },
    SegmentFinished {
        index: usize,
        completed: usize,
        total: usize,
        failed: bool,
    },
    ChunkUploaded { received: usize, total: usize },
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Writes progress to the tracing subscriber.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StrategyStarted(strategy) => {
                tracing::info!(strategy = %strategy, "Trying upload strategy");
            }
            ProgressEvent::StrategyFailed { strategy, reason } => {
                tracing::warn!(strategy = %strategy, reason = %reason, "Upload strategy failed");
            }
            ProgressEvent::SegmentsPrepared {
                count,
                segment_secs,
            } => {
                tracing::info!(count, segment_secs, "Audio split into segments");
            }
            ProgressEvent::SegmentFinished {
                index,
                completed,
                total,
                failed,
            } => {
                let percent = completed * 100 / total.max(1);
                tracing::info!(segment = index + 1, completed, total, percent, failed, "Segment finished");
            }
            ProgressEvent::ChunkUploaded { received, total } => {
                tracing::info!(received, total, "Chunk uploaded");
            }
        }
    }
}
