//! collaborative scoring: the stored preference cell, as is

use crate::dataset::PreferenceMatrix;
use crate::filter::{Filter, ThresholdFilter};
use crate::providers::{ScoreError, Scorer};
use crate::scoring::{rank_descending, ScoreRecord};

pub struct CollaborativeScorer<'a> {
    preferences: &'a PreferenceMatrix,
}

impl<'a> CollaborativeScorer<'a> {
    pub fn new(preferences: &'a PreferenceMatrix) -> Self {
        Self { preferences }
    }
}

impl Scorer for CollaborativeScorer<'_> {
    fn score(&self, product: &str, threshold: f64) -> Result<Vec<ScoreRecord>, ScoreError> {
        let column = self
            .preferences
            .column(product)
            .ok_or_else(|| ScoreError::UnknownProduct(product.to_string()))?;
        let keep = ThresholdFilter::new(threshold);

        let mut ranked: Vec<ScoreRecord> = column
            .map(|(user, preference)| ScoreRecord::new(user, preference))
            .filter(|r| keep.matches(r))
            .collect();

        rank_descending(&mut ranked);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "collaborative-filtering"
    }
}
