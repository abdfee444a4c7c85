//! Deterministic train/test splitting.
//!
//! Rows are shuffled with a seeded RNG and partitioned once per training
//! run. The same row count, ratio and seed always produce the same
//! partition, so repeated runs over the same dataset are reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};

/// Minimum number of rows a dataset needs before a split is attempted.
pub const MIN_TRAINING_ROWS: usize = 5;

/// How rows are partitioned into train and test sets.
///
/// The defaults (20% held out, seed 42) match the evaluation protocol
/// the metrics in this crate are calibrated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPolicy {
    /// Fraction of rows held out for testing, strictly between 0 and 1.
    pub test_ratio: f64,
    /// RNG seed for the shuffle.
    pub seed: u64,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

impl SplitPolicy {
    /// Validate the policy before use.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "test_ratio must be strictly between 0 and 1, got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }
}

/// Row indices assigned to each side of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Summary of the split for reports and artifacts.
    #[must_use]
    pub fn info(&self) -> SplitInfo {
        let total = (self.train.len() + self.test.len()) as f64;
        SplitInfo {
            train_size: self.train.len(),
            test_size: self.test.len(),
            train_percentage: self.train.len() as f64 / total * 100.0,
            test_percentage: self.test.len() as f64 / total * 100.0,
        }
    }
}

/// Split sizes recorded in training reports and saved artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitInfo {
    pub train_size: usize,
    pub test_size: usize,
    pub train_percentage: f64,
    pub test_percentage: f64,
}

/// Shuffle `0..n_rows` and partition into test (first `ceil(n * ratio)`
/// shuffled indices) and train (the rest).
///
/// # Errors
///
/// [`TrainingError::InsufficientRows`] when `n_rows` is below
/// [`MIN_TRAINING_ROWS`], [`TrainingError::InvalidConfig`] for an
/// out-of-range ratio.
pub fn split_indices(n_rows: usize, policy: &SplitPolicy) -> Result<SplitIndices> {
    policy.validate()?;

    if n_rows < MIN_TRAINING_ROWS {
        return Err(TrainingError::InsufficientRows {
            rows: n_rows,
            minimum: MIN_TRAINING_ROWS,
        });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(policy.seed);
    indices.shuffle(&mut rng);

    let test_size = ((n_rows as f64) * policy.test_ratio).ceil() as usize;
    // Both sides stay non-empty for any valid ratio and row count.
    let test_size = test_size.clamp(1, n_rows - 1);

    let test = indices[..test_size].to_vec();
    let train = indices[test_size..].to_vec();
    Ok(SplitIndices { train, test })
}
