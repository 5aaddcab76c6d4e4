//! Stateful classifier: pure analysis plus a working-memory append.

use crate::config::CLASSIFIER_CONFIG;
use crate::features::{cognitive_load, extract_features, select_tier};
use crate::memory::{excerpt, SharedWorkingMemory, WorkingMemory};
use crate::types::{Classification, ClassifierConfig, DecisionRecord, WorkingMemoryStats};
use cap_core::TaskTier;
use chrono::Utc;

pub struct TaskClassifier {
    config: ClassifierConfig,
    memory: SharedWorkingMemory,
}

impl TaskClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let memory = WorkingMemory::shared(config.history_capacity);
        Self { config, memory }
    }

    /// Use an externally owned history store.
    pub fn with_memory(config: ClassifierConfig, memory: SharedWorkingMemory) -> Self {
        Self { config, memory }
    }

    pub fn memory(&self) -> &SharedWorkingMemory {
        &self.memory
    }

    /// Classify without recording the decision.
    pub fn analyze(&self, prompt: &str) -> Classification {
        let weights = &self.config.load_weights;
        let features = extract_features(prompt, &self.config.indicators, weights);
        let load = cognitive_load(prompt, &features, weights);
        let tier = select_tier(load, &features, &self.config);
        Classification { tier, cognitive_load: load, features }
    }

    /// Classify and append the decision to working memory.
    pub fn classify(&self, prompt: &str) -> TaskTier {
        self.classify_detailed(prompt).tier
    }

    pub fn classify_detailed(&self, prompt: &str) -> Classification {
        let result = self.analyze(prompt);
        tracing::debug!(
            tier = %result.tier,
            load = result.cognitive_load,
            complexity = result.features.complexity,
            reasoning = result.features.reasoning_depth,
            "classified prompt"
        );
        self.memory.lock().push(DecisionRecord {
            prompt_excerpt: excerpt(prompt),
            tier: result.tier,
            cognitive_load: result.cognitive_load,
            timestamp: Utc::now(),
        });
        result
    }

    pub fn working_memory_stats(&self) -> WorkingMemoryStats {
        self.memory.lock().stats()
    }
}

impl Default for TaskClassifier {
    fn default() -> Self {
        Self::new(CLASSIFIER_CONFIG.clone())
    }
}
