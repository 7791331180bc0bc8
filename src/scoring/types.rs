use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One row surfaced for review.
pub struct ChangeRecord {
    /// Zero-based row position in the input column.
    pub row: usize,
    /// Raw input cell.
    pub original: String,
    /// Standardized output.
    pub normalized: String,
    /// `1 - cosine(original, normalized)`; higher means more altered.
    pub change_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bound and seed for the rows the scorer embeds.
pub struct SamplingConfig {
    sample_size: usize,
    seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl SamplingConfig {
    /// Creates a sampling config; `sample_size` must be positive.
    pub fn new(sample_size: usize, seed: u64) -> Result<Self, ConfigError> {
        if sample_size == 0 {
            return Err(ConfigError::ZeroValue { name: "sample size" });
        }
        Ok(Self { sample_size, seed })
    }

    /// Max rows embedded per ranking.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
