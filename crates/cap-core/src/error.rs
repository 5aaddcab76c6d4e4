use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapError {
    #[error("Model not found: {key}")]
    ModelNotFound { key: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Upstream {model} unavailable: {message}")]
    UpstreamUnavailable { model: String, message: String },
    #[error("Upstream {model} returned {status}: {body}")]
    UpstreamError { model: String, status: u16, body: String },
    #[error("Malformed response from {model}: {message}")]
    MalformedResponse { model: String, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CapError {
    /// Whether the fallback chain should move on to the next tier.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamError { .. } | Self::MalformedResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CapError>;
