//! Tier resolution and the fallback walk.

use crate::backend::{GenerationBackend, HttpBackend};
use crate::fallback::FallbackPlan;
use crate::stream::decode_stream;
use crate::types::*;
use cap_classifier::{default_classifier_config, TaskClassifier};
use cap_core::{CapError, CapibaraConfig, ExhaustedPolicy, ModelConfig, Result};
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct GenerationRouter {
    models: BTreeMap<String, ModelConfig>,
    plan: FallbackPlan,
    classifier: Arc<TaskClassifier>,
    backend: Arc<dyn GenerationBackend>,
}

impl GenerationRouter {
    /// Validates `config` so a bad fallback order fails here rather than per request.
    pub fn new(
        config: &CapibaraConfig,
        classifier: Arc<TaskClassifier>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            models: config.models.clone(),
            plan: FallbackPlan::new(&config.fallback),
            classifier,
            backend,
        })
    }

    /// Router over the HTTP backend with a fresh classifier.
    pub fn from_config(config: &CapibaraConfig) -> Result<Self> {
        let mut classifier_config = default_classifier_config();
        classifier_config.history_capacity = config.classifier.history_capacity;
        let classifier = Arc::new(TaskClassifier::new(classifier_config));
        Self::new(config, classifier, Arc::new(HttpBackend::new()?))
    }

    pub fn classifier(&self) -> &Arc<TaskClassifier> {
        &self.classifier
    }

    pub fn models(&self) -> &BTreeMap<String, ModelConfig> {
        &self.models
    }

    pub fn plan(&self) -> &FallbackPlan {
        &self.plan
    }

    fn model(&self, key: &str) -> Result<&ModelConfig> {
        self.models
            .get(key)
            .ok_or_else(|| CapError::ModelNotFound { key: key.to_string() })
    }

    /// Routing key for a request; `Auto` consults the classifier.
    pub fn resolve(&self, prompt: &str, tier: &ModelTier) -> String {
        match tier {
            ModelTier::Auto => self.classifier.classify(prompt).as_str().to_string(),
            ModelTier::Named(key) => key.clone(),
        }
    }

    /// One attempt against `key`. Upstream failures come back as an
    /// unsuccessful result; only non-retryable errors are returned as `Err`.
    pub async fn generate(&self, prompt: &str, key: &str, options: &GenerationOptions) -> Result<GenerationResult> {
        let model = self.model(key)?;
        let request = ChatRequest::for_prompt(model, prompt, options, false);
        let timeout = options.timeout.unwrap_or_else(|| model.timeout());

        let outcome = match tokio::time::timeout(timeout, self.backend.complete(model, &request, timeout)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CapError::UpstreamUnavailable {
                model: model.name.clone(),
                message: format!("timed out after {}ms", timeout.as_millis()),
            }),
        };

        match outcome {
            Ok(completion) => {
                info!(tier = key, model = %model.name, tokens = ?completion.tokens, "generation succeeded");
                Ok(GenerationResult::succeeded(key, model, completion))
            }
            Err(e) if e.is_retryable() => {
                warn!(tier = key, model = %model.name, error = %e, "generation failed");
                Ok(GenerationResult::failed(key, model, &e))
            }
            Err(e) => Err(e),
        }
    }

    /// Generate on the resolved tier, walking the fallback order on failure.
    ///
    /// Returns `Err` only when the requested key is not configured. When every
    /// tier fails, the surfaced failure follows the configured
    /// [`ExhaustedPolicy`]; `attempts` lists every key tried.
    pub async fn generate_with_fallback(&self, prompt: &str, options: &GenerationOptions) -> Result<GenerationResult> {
        let key = self.resolve(prompt, &options.model_tier);
        let first = self.generate(prompt, &key, options).await?;
        if first.success {
            return Ok(first);
        }

        let mut attempts = first.attempts.clone();
        let mut last = None;
        for next in self.plan.after(&key) {
            info!(from = %key, to = %next, "falling back");
            match self.generate(prompt, next, options).await {
                Ok(mut result) if result.success => {
                    attempts.append(&mut result.attempts);
                    result.attempts = attempts;
                    return Ok(result);
                }
                Ok(result) => {
                    attempts.extend(result.attempts.iter().cloned());
                    last = Some(result);
                }
                Err(e) => {
                    warn!(tier = %next, error = %e, "fallback attempt errored, continuing");
                    attempts.push(next.clone());
                }
            }
        }

        let mut result = match self.plan.on_exhausted() {
            ExhaustedPolicy::FirstFailure => first,
            ExhaustedPolicy::LastFailure => last.unwrap_or(first),
        };
        error!(tier = %key, attempts = ?attempts, "all generation attempts failed");
        result.attempts = attempts;
        Ok(result)
    }

    /// Open a streaming generation on the resolved tier. No fallback walk.
    ///
    /// The attempt timeout bounds opening the stream and then every gap
    /// between upstream chunks.
    pub async fn open_stream(&self, prompt: &str, options: &GenerationOptions) -> Result<StreamHandle> {
        let key = self.resolve(prompt, &options.model_tier);
        let model = self.model(&key)?;
        let request = ChatRequest::for_prompt(model, prompt, options, true);
        let timeout = options.timeout.unwrap_or_else(|| model.timeout());

        let bytes = match tokio::time::timeout(timeout, self.backend.open_stream(model, &request)).await {
            Ok(opened) => opened?,
            Err(_) => {
                return Err(CapError::UpstreamUnavailable {
                    model: model.name.clone(),
                    message: format!("stream did not open within {}ms", timeout.as_millis()),
                })
            }
        };
        info!(tier = %key, model = %model.name, "stream opened");
        Ok(StreamHandle {
            tier: key.clone(),
            model: model.name.clone(),
            provider: model.provider.clone(),
            frames: decode_stream(model.name.clone(), bytes, timeout),
        })
    }

    /// Stream a generation, calling `on_data` per content fragment and
    /// `on_end` once the upstream finishes or closes. A stream that breaks
    /// off midway still calls `on_end`, then returns `UpstreamUnavailable`.
    pub async fn stream<D, E>(
        &self,
        prompt: &str,
        options: &GenerationOptions,
        mut on_data: D,
        on_end: E,
    ) -> Result<StreamOutcome>
    where
        D: FnMut(&str),
        E: FnOnce(),
    {
        let mut handle = self.open_stream(prompt, options).await?;
        let mut outcome = StreamOutcome {
            tier: handle.tier.clone(),
            model: handle.model.clone(),
            fragments: 0,
            finish_reason: None,
        };
        let mut failure = None;
        while let Some(frame) = handle.frames.next().await {
            match frame {
                StreamFrame::Content(text) => {
                    outcome.fragments += 1;
                    on_data(&text);
                }
                StreamFrame::Done { finish_reason } => outcome.finish_reason = finish_reason,
                StreamFrame::Error(message) => failure = Some(message),
            }
        }
        on_end();
        match failure {
            Some(message) => Err(CapError::UpstreamUnavailable { model: outcome.model, message }),
            None => Ok(outcome),
        }
    }
}
