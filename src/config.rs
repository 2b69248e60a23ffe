//! Loader configuration.

use crate::error::{PrepError, Result};

/// How the test fold obtains its label vocabulary and scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitPolicy {
    /// Fit on the training file, apply the same state to the test file.
    #[default]
    FitOnTrain,
    /// Fit each file on its own data. Labels and scales may disagree between folds.
    Independent,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoaderConfig {
    pub batch_size: usize,
    /// Shuffle the training loader each pass. The test loader never shuffles.
    pub shuffle_train: bool,
    /// Seed for the shuffling RNG; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Drop a trailing batch smaller than `batch_size`.
    pub drop_last: bool,
    pub fit_policy: FitPolicy,
    pub feature_range: (f64, f64),
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            batch_size: 32,
            shuffle_train: true,
            seed: None,
            drop_last: false,
            fit_policy: FitPolicy::FitOnTrain,
            feature_range: (0.0, 1.0),
        }
    }
}

impl LoaderConfig {
    pub fn new(batch_size: usize) -> Self {
        LoaderConfig { batch_size, ..Default::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shuffle_train(mut self, shuffle: bool) -> Self {
        self.shuffle_train = shuffle;
        self
    }

    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    pub fn with_fit_policy(mut self, policy: FitPolicy) -> Self {
        self.fit_policy = policy;
        self
    }

    pub fn with_feature_range(mut self, min: f64, max: f64) -> Self {
        self.feature_range = (min, max);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PrepError::Config("batch size must be greater than 0".to_string()));
        }
        let (lo, hi) = self.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(PrepError::Config(format!("feature range ({}, {}) must be finite with min < max", lo, hi)));
        }
        Ok(())
    }
}
