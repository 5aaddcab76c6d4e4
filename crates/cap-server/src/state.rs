//! Application state shared across all handlers.

use cap_core::{CapibaraConfig, Result};
use cap_router::GenerationRouter;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<GenerationRouter>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(router: GenerationRouter) -> Self {
        Self {
            router: Arc::new(router),
            start_time: std::time::Instant::now(),
        }
    }

    /// State backed by the HTTP upstreams named in `config`.
    pub fn from_config(config: &CapibaraConfig) -> Result<Self> {
        Ok(Self::new(GenerationRouter::from_config(config)?))
    }
}
