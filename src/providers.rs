//! scorer abstraction shared by the content-based and collaborative strategies
//!
//! both strategies produce the same thing (a threshold-filtered, descending ranked list
//! of users) from different reference data, so the hybrid blend and the handlers only
//! talk to this trait.

use crate::scoring::ScoreRecord;
use thiserror::Error;

/// errors that can occur while scoring a request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("content ratio must be within [0, 1], got {0}")]
    InvalidRatio(f64),
}

pub fn validate_threshold(threshold: f64) -> Result<(), ScoreError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ScoreError::InvalidThreshold(threshold))
    }
}

pub fn validate_ratio(ratio: f64) -> Result<(), ScoreError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(ScoreError::InvalidRatio(ratio))
    }
}

/// something that ranks users by affinity to a product
pub trait Scorer: Send + Sync {
    /// users scoring at least `threshold` for `product`, highest first
    fn score(&self, product: &str, threshold: f64) -> Result<Vec<ScoreRecord>, ScoreError>;

    /// human-readable name for logging
    fn name(&self) -> &'static str;
}
