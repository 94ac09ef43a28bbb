use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{
    ChunkAck, GatewayError, ProcessedText, ProcessingGateway,
};
use crate::domain::{AudioPayload, AudioSegment, ChunkUpload, SessionId};

/// Talks to a running audioscribe server over HTTP.
pub struct HttpProcessingGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProcessingGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        decode_response(response).await
    }
}

fn file_part(data: &[u8], file_name: &str, mime: &str) -> Result<multipart::Part, GatewayError> {
    multipart::Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .map_err(|e| GatewayError::RequestFailed(format!("mime: {}", e)))
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| match e.details {
                Some(details) => format!("{}: {}", e.error, details),
                None => e.error,
            })
            .unwrap_or(body);
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Deserialize)]
struct ProcessAudioBody {
    result: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ProcessSegmentBody {
    text: String,
}

#[derive(Deserialize)]
struct UploadChunkBody {
    complete: bool,
    received: usize,
    total: usize,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[async_trait]
impl ProcessingGateway for HttpProcessingGateway {
    async fn submit_whole(
        &self,
        audio: &AudioPayload,
        prompt: &str,
    ) -> Result<ProcessedText, GatewayError> {
        let form = multipart::Form::new()
            .part(
                "audio",
                file_part(&audio.data, &audio.file_name, audio.mime.as_str())?,
            )
            .text("prompt", prompt.to_string());

        tracing::debug!(bytes = audio.size_bytes(), "Submitting whole file");
        let body: ProcessAudioBody = self.post_form("/api/process-audio", form).await?;

        Ok(ProcessedText {
            text: body.result,
            model: body.model,
        })
    }

    async fn submit_segment(
        &self,
        segment: &AudioSegment,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        let form = multipart::Form::new()
            .part(
                "audio",
                file_part(&segment.data, &segment.file_name(), "audio/wav")?,
            )
            .text("prompt", prompt.to_string())
            .text("segmentIndex", segment.index.to_string())
            .text("totalSegments", segment.total.to_string());

        let body: ProcessSegmentBody = self.post_form("/api/process-segment", form).await?;
        Ok(body.text)
    }

    async fn upload_chunk(
        &self,
        chunk: &ChunkUpload,
        prompt: Option<&str>,
        process_immediately: bool,
    ) -> Result<ChunkAck, GatewayError> {
        let mut form = multipart::Form::new()
            .part(
                "chunk",
                file_part(&chunk.data, &chunk.file_name, "application/octet-stream")?,
            )
            .text("chunkIndex", chunk.index.to_string())
            .text("totalChunks", chunk.total_chunks.to_string())
            .text("sessionId", chunk.session_id.to_string())
            .text("fileName", chunk.file_name.clone())
            .text("mimeType", chunk.mime_type.clone())
            .text("processImmediately", process_immediately.to_string());
        if let Some(prompt) = prompt {
            form = form.text("prompt", prompt.to_string());
        }

        let body: UploadChunkBody = self.post_form("/api/upload-chunk", form).await?;

        Ok(ChunkAck {
            complete: body.complete,
            received: body.received,
            total: body.total,
            result: body.result.map(|text| ProcessedText {
                text,
                model: body.model,
            }),
        })
    }

    async fn discard_session(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url("/api/upload-chunk"))
            .query(&[("sessionId", session_id.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        decode_response::<serde_json::Value>(response).await.map(|_| ())
    }
}
