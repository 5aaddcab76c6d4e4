//! Upstream payload shapes. vLLM speaks the OpenAI format; Ollama and
//! llama.cpp-style servers put the text in top-level fields instead.

use crate::types::{Completion, StreamFrame};
use cap_core::{CapError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<MessageBody>,
    delta: Option<MessageBody>,
    text: Option<String>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    message: Option<MessageBody>,
    response: Option<String>,
    content: Option<String>,
    usage: Option<Usage>,
    eval_count: Option<u64>,
    done: Option<bool>,
    done_reason: Option<String>,
    stop: Option<bool>,
}

impl Payload {
    fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    fn text(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|c| {
                c.message
                    .as_ref()
                    .or(c.delta.as_ref())
                    .and_then(|m| m.content.as_deref())
                    .or(c.text.as_deref())
            })
            .or_else(|| self.message.as_ref().and_then(|m| m.content.as_deref()))
            .or(self.response.as_deref())
            .or(self.content.as_deref())
    }

    fn finish_reason(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|c| c.finish_reason.as_deref())
            .or(self.done_reason.as_deref())
    }

    fn tokens(&self) -> Option<u64> {
        self.usage
            .as_ref()
            .and_then(|u| u.total_tokens.or(u.completion_tokens))
            .or(self.eval_count)
    }
}

/// Parse a non-streaming completion body.
pub fn parse_completion(model: &str, body: &str) -> Result<Completion> {
    let payload: Payload = serde_json::from_str(body).map_err(|e| CapError::MalformedResponse {
        model: model.to_string(),
        message: format!("invalid JSON: {e}"),
    })?;
    let content = payload.text().ok_or_else(|| CapError::MalformedResponse {
        model: model.to_string(),
        message: "no content in response".into(),
    })?;
    Ok(Completion {
        content: content.to_string(),
        model: payload.model.clone().unwrap_or_else(|| model.to_string()),
        tokens: payload.tokens(),
        finish_reason: payload.finish_reason().map(str::to_string),
    })
}

/// Frames carried by one streamed JSON record.
pub fn stream_frames(json: &str) -> std::result::Result<Vec<StreamFrame>, serde_json::Error> {
    let payload: Payload = serde_json::from_str(json)?;
    let mut frames = Vec::new();
    if let Some(text) = payload.text().filter(|t| !t.is_empty()) {
        frames.push(StreamFrame::Content(text.to_string()));
    }
    let finished = payload.done.unwrap_or(false)
        || payload.stop.unwrap_or(false)
        || payload.first_choice().is_some_and(|c| c.finish_reason.is_some());
    if finished {
        frames.push(StreamFrame::Done { finish_reason: payload.finish_reason().map(str::to_string) });
    }
    Ok(frames)
}
