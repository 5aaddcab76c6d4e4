use cap_core::TaskTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weighted indicator counts for a single prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptFeatures {
    pub complexity: f64,
    pub context_demand: f64,
    pub reasoning_depth: f64,
    pub creative_elements: f64,
    pub factual_elements: f64,
}

impl PromptFeatures {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Indicator phrase lists, one per feature. Phrases are matched lower-cased.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub complexity: Vec<String>,
    pub context: Vec<String>,
    pub reasoning: Vec<String>,
    pub creative: Vec<String>,
    pub factual: Vec<String>,
}

/// Per-match feature weights and the linear load coefficients.
#[derive(Debug, Clone)]
pub struct LoadWeights {
    pub complexity_match: f64,
    pub other_match: f64,
    pub complexity: f64,
    pub context_demand: f64,
    pub reasoning_depth: f64,
    pub creative_elements: f64,
    pub factual_elements: f64,
    /// (chars, bonus) pairs; every threshold exceeded adds its bonus.
    pub length_bonuses: Vec<(usize, f64)>,
    pub sentence_threshold: usize,
    pub sentence_bonus: f64,
}

/// Full classifier config.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub indicators: IndicatorSet,
    pub load_weights: LoadWeights,
    pub complex_threshold: f64,
    pub balanced_threshold: f64,
    pub history_capacity: usize,
}

/// Outcome of analysing one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub tier: TaskTier,
    pub cognitive_load: f64,
    pub features: PromptFeatures,
}

/// One retained classification decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub prompt_excerpt: String,
    pub tier: TaskTier,
    pub cognitive_load: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates over the retained window only, not all-time decisions.
#[derive(Debug, Clone, Serialize)]
pub struct WorkingMemoryStats {
    pub total_decisions: usize,
    pub task_type_distribution: HashMap<TaskTier, usize>,
    pub average_cognitive_load: f64,
    /// Retention capacity the statistics are computed over.
    pub window: usize,
}

/// Result of the keyword classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordClassification {
    pub category: &'static str,
    pub subcategory: &'static str,
    pub confidence: f64,
    pub suggested_model: &'static str,
    pub needs_context: bool,
    pub needs_rag: bool,
}
