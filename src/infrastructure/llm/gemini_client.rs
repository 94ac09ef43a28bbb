use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::stream::StreamExt;
use reqwest::Client;

use crate::application::ports::{GenerationClient, GenerationError};
use crate::domain::AudioPayload;
use crate::presentation::config::GeminiSettings;

use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, InlineData, RequestPart,
};

const PROBE_PROMPT: &str = "test";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    streaming: bool,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        streaming: bool,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::ApiRequestFailed(format!("client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            streaming,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn build_request(audio: Option<&AudioPayload>, prompt: &str) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(audio) = audio {
            parts.push(RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: audio.mime.as_str().to_string(),
                    data: STANDARD.encode(&audio.data),
                },
            });
        }
        parts.push(RequestPart::Text {
            text: prompt.to_string(),
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }

    async fn send(
        &self,
        url: String,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn generate_unary(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, GenerationError> {
        let response = self
            .send(self.endpoint(model, "generateContent"), body)
            .await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        if let Some(reason) = parsed.block_reason() {
            return Err(GenerationError::InvalidResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            tracing::debug!(
                model = %model,
                finish_reason = ?parsed.finish_reason(),
                "Gemini returned no text"
            );
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }

    /// Accumulates server-sent chunks. A stream that breaks after text has
    /// arrived yields the partial text instead of an error.
    async fn generate_streaming(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, GenerationError> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));
        let response = self.send(url, body).await?;

        let mut stream = response.bytes_stream();
        let mut pending = BytesMut::new();
        let mut accumulated = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) if !accumulated.is_empty() => {
                    tracing::warn!(
                        model = %model,
                        error = %e,
                        chars = accumulated.len(),
                        "Stream interrupted, keeping partial text"
                    );
                    return Ok(accumulated);
                }
                Err(e) => return Err(GenerationError::ApiRequestFailed(e.to_string())),
            };

            // Network reads may end mid-character, so only whole lines are decoded.
            pending.extend_from_slice(&bytes);
            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line = pending.split_to(newline + 1);
                append_sse_line(&String::from_utf8_lossy(&line), &mut accumulated);
            }
        }
        append_sse_line(&String::from_utf8_lossy(&pending), &mut accumulated);

        if accumulated.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(accumulated)
    }
}

fn append_sse_line(line: &str, accumulated: &mut String) {
    let Some(data) = line.trim_end().strip_prefix("data:") else {
        return;
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return;
    }
    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(event) => accumulated.push_str(&event.text()),
        Err(e) => tracing::debug!(error = %e, "Skipping unparseable stream event"),
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let body = Self::build_request(Some(audio), prompt);

        tracing::debug!(
            model = %model,
            bytes = audio.size_bytes(),
            streaming = self.streaming,
            "Sending audio to Gemini"
        );

        if self.streaming {
            self.generate_streaming(model, &body).await
        } else {
            self.generate_unary(model, &body).await
        }
    }

    async fn probe(&self, model: &str) -> Result<(), GenerationError> {
        let body = Self::build_request(None, PROBE_PROMPT);
        self.generate_unary(model, &body).await.map(|_| ())
    }
}

pub fn create_gemini_client(settings: &GeminiSettings) -> Result<GeminiClient, GenerationError> {
    if settings.api_key.trim().is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; every generation request will fail");
    }

    GeminiClient::new(
        settings.api_key.clone(),
        settings.base_url.clone(),
        settings.streaming,
        Duration::from_secs(settings.request_timeout_secs),
    )
}
