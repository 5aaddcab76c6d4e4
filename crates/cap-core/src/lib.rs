//! Shared building blocks for the Capibara6 inference gateway: service tiers,
//! the error taxonomy and gateway configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CapibaraConfig, ClassifierSettings, ExhaustedPolicy, FallbackConfig, ModelConfig, ServerConfig};
pub use error::{CapError, Result};
pub use types::{estimate_response_time, TaskTier};
