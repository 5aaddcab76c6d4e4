use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use crate::error::{CapError, Result};
use crate::types::TaskTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapibaraConfig {
    pub server: ServerConfig,
    pub models: BTreeMap<String, ModelConfig>,
    pub fallback: FallbackConfig,
    pub classifier: ClassifierSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream model bound to a tier (or any other routing key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Full URL of an OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_provider() -> String {
    "vllm".into()
}

/// Which failure is surfaced once every tier in the chain has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedPolicy {
    /// The primary attempt's failure.
    #[default]
    FirstFailure,
    /// The failure of the last tier tried.
    LastFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub order: Vec<String>,
    pub on_exhausted: ExhaustedPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub history_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5001,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            order: TaskTier::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            on_exhausted: ExhaustedPolicy::FirstFailure,
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self { history_capacity: 50 }
    }
}

fn model(name: &str, endpoint: &str, provider: &str, max_tokens: u32, timeout_secs: u64) -> ModelConfig {
    ModelConfig {
        name: name.into(),
        endpoint: endpoint.into(),
        provider: provider.into(),
        max_tokens,
        timeout_secs,
    }
}

impl Default for CapibaraConfig {
    fn default() -> Self {
        let ollama = "http://localhost:11434/v1/chat/completions";
        let vllm = "http://localhost:8000/v1/chat/completions";
        let mut models = BTreeMap::new();
        models.insert(TaskTier::FastResponse.as_str().into(), model("phi4:mini", ollama, "ollama", 512, 15));
        models.insert(TaskTier::Balanced.as_str().into(), model("mistral:7b-instruct", ollama, "ollama", 1024, 30));
        models.insert(TaskTier::Complex.as_str().into(), model("gpt-oss-20b", vllm, "vllm", 2048, 45));
        Self {
            server: ServerConfig::default(),
            models,
            fallback: FallbackConfig::default(),
            classifier: ClassifierSettings::default(),
        }
    }
}

impl CapibaraConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read a JSON config file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), models = config.models.len(), "loaded configuration");
        Ok(config)
    }

    /// Apply `CAPIBARA_HOST`, `CAPIBARA_PORT` and `CAPIBARA_FALLBACK_ENABLED`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("CAPIBARA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CAPIBARA_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| CapError::Configuration(format!("invalid CAPIBARA_PORT: {port}")))?;
        }
        if let Some(enabled) = lookup("CAPIBARA_FALLBACK_ENABLED") {
            self.fallback.enabled = match enabled.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(CapError::Configuration(format!(
                        "invalid CAPIBARA_FALLBACK_ENABLED: {enabled}"
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn model(&self, key: &str) -> Result<&ModelConfig> {
        self.models
            .get(key)
            .ok_or_else(|| CapError::ModelNotFound { key: key.to_string() })
    }

    /// Startup checks; a config that passes never yields `ModelNotFound` for a tier.
    pub fn validate(&self) -> Result<()> {
        if self.fallback.order.is_empty() {
            return Err(CapError::Configuration("fallback order is empty".into()));
        }
        let mut seen = HashSet::new();
        for key in &self.fallback.order {
            if !seen.insert(key.as_str()) {
                return Err(CapError::Configuration(format!("duplicate fallback entry: {key}")));
            }
            if !self.models.contains_key(key) {
                return Err(CapError::Configuration(format!("fallback entry {key} has no model")));
            }
        }
        for (key, model) in &self.models {
            if !seen.contains(key.as_str()) {
                return Err(CapError::Configuration(format!("model {key} missing from fallback order")));
            }
            if model.max_tokens == 0 {
                return Err(CapError::Configuration(format!("model {key} has max_tokens = 0")));
            }
            if model.timeout_secs == 0 {
                return Err(CapError::Configuration(format!("model {key} has a zero timeout")));
            }
        }
        for tier in TaskTier::ALL {
            if !self.models.contains_key(tier.as_str()) {
                return Err(CapError::Configuration(format!("no model bound to tier {tier}")));
            }
        }
        if self.classifier.history_capacity == 0 {
            return Err(CapError::Configuration("classifier history capacity must be positive".into()));
        }
        Ok(())
    }
}
