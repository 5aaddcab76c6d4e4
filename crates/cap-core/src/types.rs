use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CapError;

/// Service tier a prompt is routed to.
///
/// Ordering is only meaningful for fallback sequencing, never as a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTier {
    FastResponse,
    Balanced,
    Complex,
}

impl TaskTier {
    /// All tiers in default fallback order.
    pub const ALL: [TaskTier; 3] = [TaskTier::FastResponse, TaskTier::Balanced, TaskTier::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastResponse => "fast_response",
            Self::Balanced => "balanced",
            Self::Complex => "complex",
        }
    }

    /// Expected latency of a generation served by this tier.
    pub fn estimated_response_time(&self) -> Duration {
        match self {
            Self::FastResponse => Duration::from_millis(2_000),
            Self::Balanced => Duration::from_millis(4_000),
            Self::Complex => Duration::from_millis(120_000),
        }
    }
}

impl fmt::Display for TaskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskTier {
    type Err = CapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast_response" => Ok(Self::FastResponse),
            "balanced" => Ok(Self::Balanced),
            "complex" => Ok(Self::Complex),
            other => Err(CapError::ModelNotFound { key: other.to_string() }),
        }
    }
}

/// Estimated response time in milliseconds for a tier name, `None` for unknown keys.
pub fn estimate_response_time(key: &str) -> Option<u64> {
    key.parse::<TaskTier>()
        .ok()
        .map(|tier| tier.estimated_response_time().as_millis() as u64)
}
