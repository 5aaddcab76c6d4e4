//! Upstream inference backends.

use crate::types::{ByteStream, ChatRequest, Completion};
use crate::wire::parse_completion;
use async_trait::async_trait;
use cap_core::{CapError, ModelConfig, Result};
use futures::StreamExt;
use std::time::Duration;
use tracing::debug;

/// A service able to run chat completions for a configured model.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one non-streaming completion.
    async fn complete(&self, model: &ModelConfig, request: &ChatRequest, timeout: Duration) -> Result<Completion>;

    /// Open a streaming completion and return the raw body chunks.
    async fn open_stream(&self, model: &ModelConfig, request: &ChatRequest) -> Result<ByteStream>;
}

/// OpenAI-compatible HTTP backend (vLLM, Ollama `/v1`, llama.cpp server).
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CapError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(&self, model: &ModelConfig, request: &ChatRequest, timeout: Option<Duration>) -> Result<reqwest::Response> {
        let mut builder = self.client.post(&model.endpoint).json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().await.map_err(|e| unavailable(model, e))?;

        let status = response.status();
        debug!(model = %model.name, status = %status, stream = request.stream, "upstream response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapError::UpstreamError {
                model: model.name.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn unavailable(model: &ModelConfig, err: reqwest::Error) -> CapError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    CapError::UpstreamUnavailable { model: model.name.clone(), message }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn complete(&self, model: &ModelConfig, request: &ChatRequest, timeout: Duration) -> Result<Completion> {
        let response = self.send(model, request, Some(timeout)).await?;
        let body = response.text().await.map_err(|e| unavailable(model, e))?;
        parse_completion(&model.name, &body)
    }

    async fn open_stream(&self, model: &ModelConfig, request: &ChatRequest) -> Result<ByteStream> {
        let response = self.send(model, request, None).await?;
        let name = model.name.clone();
        Ok(response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| CapError::UpstreamUnavailable { model: name.clone(), message: e.to_string() })
            })
            .boxed())
    }
}
