//! Ordered fallback chain.

use cap_core::{ExhaustedPolicy, FallbackConfig};

#[derive(Debug, Clone)]
pub struct FallbackPlan {
    order: Vec<String>,
    enabled: bool,
    on_exhausted: ExhaustedPolicy,
}

impl FallbackPlan {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            order: config.order.clone(),
            enabled: config.enabled,
            on_exhausted: config.on_exhausted,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_exhausted(&self) -> ExhaustedPolicy {
        self.on_exhausted
    }

    /// Keys strictly after `key`, in order. Empty when disabled or `key` is unknown.
    pub fn after(&self, key: &str) -> &[String] {
        if !self.enabled {
            return &[];
        }
        match self.order.iter().position(|k| k == key) {
            Some(idx) => &self.order[idx + 1..],
            None => &[],
        }
    }
}
