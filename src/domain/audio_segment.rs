use bytes::Bytes;

/// A self-contained WAV covering `start_secs..end_secs` of the recording.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub index: usize,
    pub total: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub data: Bytes,
}

impl AudioSegment {
    pub fn file_name(&self) -> String {
        format!("segment_{:03}.wav", self.index + 1)
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Appends a note naming the part when the recording was split.
pub fn segment_prompt(prompt: &str, index: usize, total: usize) -> String {
    if total > 1 {
        format!(
            "{}\n\nNote: this is part {} of {} of the audio file. Transcribe this part only.",
            prompt,
            index + 1,
            total
        )
    } else {
        prompt.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    Transcribed { index: usize, text: String },
    Failed { index: usize, reason: String },
}

impl SegmentOutcome {
    pub fn index(&self) -> usize {
        match self {
            SegmentOutcome::Transcribed { index, .. } | SegmentOutcome::Failed { index, .. } => {
                *index
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SegmentOutcome::Failed { .. })
    }
}

/// Joins segment outcomes in index order, marking failed segments inline.
pub fn merge_segment_outcomes(outcomes: &[SegmentOutcome]) -> String {
    let total = outcomes.len();
    let mut ordered: Vec<&SegmentOutcome> = outcomes.iter().collect();
    ordered.sort_by_key(|o| o.index());

    ordered
        .into_iter()
        .map(|outcome| match outcome {
            SegmentOutcome::Transcribed { text, .. } => text.trim().to_string(),
            SegmentOutcome::Failed { index, reason } => {
                format!("[Segment {}/{} failed: {}]", index + 1, total, reason)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
