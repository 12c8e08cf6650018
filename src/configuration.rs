//! Configuration types for builders and policy-keyed indexes

use serde::{Deserialize, Serialize};

use crate::error::SeqResult;

/// Staging buffer configuration for [`crate::builder::ImmutableBuilder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub initial_capacity: usize,
    pub growth_strategy: GrowthStrategy,
}

/// Strategy for growing a staging buffer once it is full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrowthStrategy {
    /// Grow by a fixed number of slots
    Linear(usize),
    /// Grow by a multiplier of the current capacity
    Exponential(f64),
    /// Grow by exactly the slot that is needed
    Fixed,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            growth_strategy: GrowthStrategy::Exponential(2.0),
        }
    }
}

impl BufferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity reserved when the builder is opened
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the growth strategy used when the buffer is full
    pub fn growth_strategy(mut self, strategy: GrowthStrategy) -> Self {
        self.growth_strategy = strategy;
        self
    }

    /// Load a buffer configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> SeqResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GrowthStrategy {
    /// Capacity to grow to when a buffer of `current` slots is full.
    /// Always at least `current + 1`.
    pub fn next_capacity(&self, current: usize) -> usize {
        let grown = match *self {
            GrowthStrategy::Linear(step) => current.saturating_add(step),
            GrowthStrategy::Exponential(factor) if factor > 1.0 => {
                (current as f64 * factor).ceil() as usize
            }
            GrowthStrategy::Exponential(_) | GrowthStrategy::Fixed => current.saturating_add(1),
        };
        grown.max(current.saturating_add(1))
    }
}

/// Configuration for policy-keyed lookup and dedup structures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub initial_capacity: usize,
    /// Scan existing entries on insert to detect equal values with different
    /// hashes. O(n) per insert; meant for debugging custom policies.
    pub verify_contract: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            verify_contract: false,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Enable or disable equals/hash contract verification on insert
    pub fn verify_contract(mut self, verify: bool) -> Self {
        self.verify_contract = verify;
        self
    }

    /// Load an index configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> SeqResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
