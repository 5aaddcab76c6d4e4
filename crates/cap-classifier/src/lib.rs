//! Capibara6 prompt classifier: lexical feature scoring into service tiers,
//! plus the regex keyword classifier used for model-name suggestions.

pub mod types;
pub mod config;
pub mod features;
pub mod memory;
pub mod classifier;
pub mod keyword;

pub use types::*;
pub use config::{default_classifier_config, CLASSIFIER_CONFIG};
pub use features::{cognitive_load, extract_features, select_tier};
pub use memory::{SharedWorkingMemory, WorkingMemory};
pub use classifier::TaskClassifier;
pub use keyword::classify_by_keyword;

#[cfg(test)]
mod tests;
