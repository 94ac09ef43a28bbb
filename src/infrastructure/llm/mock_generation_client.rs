use std::time::Duration;

use crate::application::ports::{GenerationClient, GenerationError};
use crate::domain::AudioPayload;

/// Canned responses for scaffold mode.
pub struct MockGenerationClient {
    delay: Duration,
}

impl MockGenerationClient {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(
        &self,
        model: &str,
        audio: &AudioPayload,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(format!(
            "Mock transcript from {} for {} ({} bytes, {})",
            model,
            audio.file_name,
            audio.size_bytes(),
            audio.mime.as_str()
        ))
    }

    async fn probe(&self, _model: &str) -> Result<(), GenerationError> {
        Ok(())
    }
}
