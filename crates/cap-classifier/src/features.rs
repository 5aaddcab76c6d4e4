//! Feature extraction, cognitive load and tier selection.

use crate::types::{ClassifierConfig, IndicatorSet, LoadWeights, PromptFeatures};
use cap_core::TaskTier;

fn score_phrases(text: &str, phrases: &[String], weight: f64) -> f64 {
    phrases.iter().filter(|p| text.contains(p.as_str())).count() as f64 * weight
}

/// Score every indicator list against the lower-cased prompt.
///
/// Each phrase contributes its weight once when present; distinct phrases
/// from the same list all add up.
pub fn extract_features(prompt: &str, indicators: &IndicatorSet, weights: &LoadWeights) -> PromptFeatures {
    let text = prompt.to_lowercase();
    if text.trim().is_empty() {
        return PromptFeatures::default();
    }
    PromptFeatures {
        complexity: score_phrases(&text, &indicators.complexity, weights.complexity_match),
        context_demand: score_phrases(&text, &indicators.context, weights.other_match),
        reasoning_depth: score_phrases(&text, &indicators.reasoning, weights.other_match),
        creative_elements: score_phrases(&text, &indicators.creative, weights.other_match),
        factual_elements: score_phrases(&text, &indicators.factual, weights.other_match),
    }
}

/// Non-empty fragments between runs of `.`, `!` and `?`.
pub fn sentence_count(prompt: &str) -> usize {
    prompt
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Linear load estimate clamped to `[0, 1]`.
pub fn cognitive_load(prompt: &str, features: &PromptFeatures, weights: &LoadWeights) -> f64 {
    let mut load = weights.complexity * features.complexity
        + weights.context_demand * features.context_demand
        + weights.reasoning_depth * features.reasoning_depth
        + weights.creative_elements * features.creative_elements
        + weights.factual_elements * features.factual_elements;

    let length = prompt.chars().count();
    for (threshold, bonus) in &weights.length_bonuses {
        if length > *threshold {
            load += bonus;
        }
    }

    if sentence_count(prompt) > weights.sentence_threshold {
        load += weights.sentence_bonus;
    }

    load.clamp(0.0, 1.0)
}

/// Hierarchical selection; first matching rule wins.
pub fn select_tier(load: f64, features: &PromptFeatures, config: &ClassifierConfig) -> TaskTier {
    if load > config.complex_threshold {
        return TaskTier::Complex;
    }
    if load > config.balanced_threshold {
        if features.reasoning_depth > 2.0 || features.complexity > 4.0 || features.context_demand > 2.0 {
            return TaskTier::Complex;
        }
        return TaskTier::Balanced;
    }
    if features.factual_elements > 3.0 {
        TaskTier::Balanced
    } else {
        TaskTier::FastResponse
    }
}
