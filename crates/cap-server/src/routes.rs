use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use cap_classifier::{classify_by_keyword, KeywordClassification, WorkingMemoryStats};
use cap_router::{GenerationOptions, ModelTier, StreamFrame};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};

/// Shown to users when every tier in the fallback chain failed.
pub const FALLBACK_MESSAGE: &str =
    "Lo siento, el servicio no está disponible temporalmente. Por favor, inténtalo de nuevo en unos momentos.";

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/chat/stream", post(chat_stream))
}

pub fn classify_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/classify", post(classify))
        .route("/api/v1/classify/tier", post(classify_tier))
        .route("/api/v1/classifier/stats", get(classifier_stats))
}

fn first_text<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatBody {
    pub message: Option<String>,
    pub prompt: Option<String>,
    pub text: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stream: Option<bool>,
}

impl ChatBody {
    fn prompt(&self) -> Result<String, ApiError> {
        first_text(&[&self.message, &self.prompt, &self.text])
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("one of message, prompt or text is required"))
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            model_tier: ModelTier::parse(self.model.as_deref()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
            timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyBody {
    pub text: Option<String>,
    pub message: Option<String>,
    pub query: Option<String>,
}

impl ClassifyBody {
    fn text(&self) -> Result<&str, ApiError> {
        first_text(&[&self.text, &self.message, &self.query])
            .ok_or_else(|| ApiError::bad_request("one of text, message or query is required"))
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "models": state.router.models().keys().collect::<Vec<_>>(),
        "fallback_enabled": state.router.plan().enabled(),
        "fallback_order": state.router.plan().order(),
    }))
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Result<Response, ApiError> {
    let prompt = body.prompt()?;
    let options = body.options();
    if body.stream.unwrap_or(false) {
        return Ok(stream_response(state, prompt, options).await);
    }

    let result = state.router.generate_with_fallback(&prompt, &options).await?;
    if result.success {
        let text = result.response_text.unwrap_or_default();
        return Ok(Json(json!({
            "response": text,
            "content": text,
            "model": result.model,
            "provider": result.provider,
            "tier": result.tier,
            "tokens": result.token_count,
            "finish_reason": result.finish_reason,
        }))
        .into_response());
    }

    let body = json!({
        "response": FALLBACK_MESSAGE,
        "content": FALLBACK_MESSAGE,
        "fallback": true,
        "model": result.model,
        "tier": result.tier,
        "error": result.error_message,
        "attempts": result.attempts,
    });
    Ok((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response())
}

async fn chat_stream(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Result<Response, ApiError> {
    let prompt = body.prompt()?;
    Ok(stream_response(state, prompt, body.options()).await)
}

fn frame_json(frame: StreamFrame) -> Value {
    match frame {
        StreamFrame::Content(content) => json!({ "type": "content", "content": content }),
        StreamFrame::Done { finish_reason } => json!({ "type": "done", "finish_reason": finish_reason }),
        StreamFrame::Error(error) => fallback_frame(error),
    }
}

fn fallback_frame(error: String) -> Value {
    json!({ "type": "error", "fallback": true, "content": FALLBACK_MESSAGE, "error": error })
}

/// SSE frames: `start`, `content`*, `done` (or `error` if the upstream broke
/// off), then `complete`.
async fn stream_response(state: AppState, prompt: String, options: GenerationOptions) -> Response {
    let (start, frames) = match state.router.open_stream(&prompt, &options).await {
        Ok(handle) => (
            json!({ "type": "start", "model": handle.model, "tier": handle.tier, "provider": handle.provider }),
            handle.frames.map(frame_json).boxed(),
        ),
        Err(e) if e.is_retryable() => {
            tracing::warn!(error = %e, "stream could not be opened");
            let error = fallback_frame(e.to_string());
            (json!({ "type": "start" }), stream::once(async move { error }).boxed())
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    let events = stream::once(async move { start })
        .chain(frames)
        .chain(stream::once(async { json!({ "type": "complete" }) }))
        .map(|value| Event::default().json_data(value));
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

async fn classify(Json(body): Json<ClassifyBody>) -> Result<Json<KeywordClassification>, ApiError> {
    Ok(Json(classify_by_keyword(body.text()?)))
}

async fn classify_tier(State(state): State<AppState>, Json(body): Json<ClassifyBody>) -> Result<Json<Value>, ApiError> {
    let text = body.text()?;
    let result = state.router.classifier().classify_detailed(text);
    Ok(Json(json!({
        "tier": result.tier,
        "cognitive_load": result.cognitive_load,
        "features": result.features,
        "estimated_response_ms": result.tier.estimated_response_time().as_millis() as u64,
    })))
}

async fn classifier_stats(State(state): State<AppState>) -> Json<WorkingMemoryStats> {
    Json(state.router.classifier().working_memory_stats())
}
