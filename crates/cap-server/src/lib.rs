//! Capibara6 HTTP gateway (Axum).
//!
//! Exposes chat generation with tier fallback, SSE streaming, the keyword
//! and tier classifiers, and health/statistics endpoints.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use cap_core::{CapibaraConfig, Result};
use state::AppState;

/// Build the application router against the upstreams in `config`.
pub fn app(config: &CapibaraConfig) -> Result<Router> {
    Ok(app_with_state(AppState::from_config(config)?))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::chat_routes())
        .merge(routes::classify_routes())
        .with_state(state)
}
