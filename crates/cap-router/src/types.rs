use cap_core::{ModelConfig, TaskTier};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling on generated tokens regardless of model config.
pub const MAX_TOKENS_CEILING: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;

/// Raw response body chunks from an upstream.
pub type ByteStream = BoxStream<'static, cap_core::Result<bytes::Bytes>>;

/// Decoded stream frames.
pub type FrameStream = BoxStream<'static, StreamFrame>;

/// Which routing key serves a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelTier {
    /// Let the classifier pick a tier.
    #[default]
    Auto,
    /// A tier name or any other configured model key.
    Named(String),
}

impl ModelTier {
    /// `None`, `""` and `"auto"` resolve to [`ModelTier::Auto`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("auto") => Self::Auto,
            Some(key) => Self::Named(key.to_string()),
        }
    }
}

impl From<TaskTier> for ModelTier {
    fn from(tier: TaskTier) -> Self {
        Self::Named(tier.as_str().to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub model_tier: ModelTier,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    /// Overrides the model's configured timeout.
    pub timeout: Option<Duration>,
}

impl GenerationOptions {
    pub fn with_tier(tier: impl Into<ModelTier>) -> Self {
        Self { model_tier: tier.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI-style chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub stream: bool,
}

impl ChatRequest {
    pub fn for_prompt(model: &ModelConfig, prompt: &str, options: &GenerationOptions, stream: bool) -> Self {
        let requested = options.max_tokens.unwrap_or(model.max_tokens);
        Self {
            model: model.name.clone(),
            messages: vec![ChatMessage { role: "user".into(), content: prompt.to_string() }],
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: requested.min(model.max_tokens).min(MAX_TOKENS_CEILING),
            top_p: options.top_p.unwrap_or(DEFAULT_TOP_P),
            top_k: options.top_k.unwrap_or(DEFAULT_TOP_K),
            stream,
        }
    }
}

/// A successful upstream completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub tokens: Option<u64>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Routing key that produced this result.
    pub tier: String,
    pub model: String,
    pub provider: String,
    pub response_text: Option<String>,
    pub token_count: Option<u64>,
    pub finish_reason: Option<String>,
    pub error_message: Option<String>,
    /// Keys tried, in order.
    pub attempts: Vec<String>,
}

impl GenerationResult {
    pub fn succeeded(key: &str, model: &ModelConfig, completion: Completion) -> Self {
        Self {
            success: true,
            tier: key.to_string(),
            model: completion.model,
            provider: model.provider.clone(),
            response_text: Some(completion.content),
            token_count: completion.tokens,
            finish_reason: completion.finish_reason,
            error_message: None,
            attempts: vec![key.to_string()],
        }
    }

    pub fn failed(key: &str, model: &ModelConfig, error: &cap_core::CapError) -> Self {
        Self {
            success: false,
            tier: key.to_string(),
            model: model.name.clone(),
            provider: model.provider.clone(),
            response_text: None,
            token_count: None,
            finish_reason: None,
            error_message: Some(error.to_string()),
            attempts: vec![key.to_string()],
        }
    }
}

/// One decoded streaming event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    Content(String),
    Done { finish_reason: Option<String> },
    /// The upstream broke off or went quiet before finishing; always the last frame.
    Error(String),
}

/// An opened upstream stream, already decoded into frames.
pub struct StreamHandle {
    pub tier: String,
    pub model: String,
    pub provider: String,
    pub frames: FrameStream,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamOutcome {
    pub tier: String,
    pub model: String,
    pub fragments: usize,
    pub finish_reason: Option<String>,
}
