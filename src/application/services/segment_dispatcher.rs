use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::application::ports::ProcessingGateway;
use crate::application::services::{ProgressEvent, ProgressSink};
use crate::domain::{AudioSegment, SegmentOutcome};

/// Sends segments in windows of at most `window` simultaneous calls. Each
/// window finishes completely before the next one starts.
pub struct SegmentDispatcher<P: ?Sized>
where
    P: ProcessingGateway,
{
    gateway: Arc<P>,
    window: usize,
}

impl<P: ?Sized> SegmentDispatcher<P>
where
    P: ProcessingGateway,
{
    pub fn new(gateway: Arc<P>, window: usize) -> Self {
        Self {
            gateway,
            window: window.max(1),
        }
    }

    pub async fn dispatch(
        &self,
        segments: &[AudioSegment],
        prompt: &str,
        progress: &dyn ProgressSink,
    ) -> Vec<SegmentOutcome> {
        let total = segments.len();
        let mut outcomes = Vec::with_capacity(total);

        for batch in segments.chunks(self.window) {
            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|segment| async move {
                    let result = self.gateway.submit_segment(segment, prompt).await;
                    (segment.index, result)
                })
                .collect();

            while let Some((index, result)) = in_flight.next().await {
                let outcome = match result {
                    Ok(text) => SegmentOutcome::Transcribed { index, text },
                    Err(e) => {
                        tracing::warn!(segment = index + 1, total, error = %e, "Segment failed");
                        SegmentOutcome::Failed {
                            index,
                            reason: e.to_string(),
                        }
                    }
                };

                progress.report(ProgressEvent::SegmentFinished {
                    index,
                    completed: outcomes.len() + 1,
                    total,
                    failed: outcome.is_failure(),
                });
                outcomes.push(outcome);
            }
        }

        outcomes.sort_by_key(SegmentOutcome::index);
        outcomes
    }
}
