//! Bounded decision history.

use crate::types::{DecisionRecord, WorkingMemoryStats};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

const EXCERPT_CHARS: usize = 100;

/// History store shared between classifiers and request handlers.
pub type SharedWorkingMemory = Arc<Mutex<WorkingMemory>>;

/// Fixed-capacity FIFO of recent decisions.
#[derive(Debug, Clone)]
pub struct WorkingMemory {
    records: VecDeque<DecisionRecord>,
    capacity: usize,
}

impl WorkingMemory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { records: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn shared(capacity: usize) -> SharedWorkingMemory {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Append, evicting the oldest record once over capacity.
    pub fn push(&mut self, record: DecisionRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first.
    pub fn records(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn stats(&self) -> WorkingMemoryStats {
        let mut distribution = HashMap::new();
        let mut load_sum = 0.0;
        for record in &self.records {
            *distribution.entry(record.tier).or_insert(0) += 1;
            load_sum += record.cognitive_load;
        }
        let total = self.records.len();
        WorkingMemoryStats {
            total_decisions: total,
            task_type_distribution: distribution,
            average_cognitive_load: if total == 0 { 0.0 } else { load_sum / total as f64 },
            window: self.capacity,
        }
    }
}

/// First 100 characters of the prompt, with `...` when truncated.
pub fn excerpt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
