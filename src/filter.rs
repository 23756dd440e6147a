//! composable result filters
//!
//! filters are predicates over scored users that can be combined into the
//! per-request filtering applied before ranking, blending and bucketing.

use crate::scoring::ScoreRecord;
use regex::Regex;

/// a scored user that can be filtered
pub trait Filterable {
    fn user_id(&self) -> &str;
    fn score(&self) -> f64;
}

impl Filterable for ScoreRecord {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// a predicate that can accept or reject items
pub trait Filter<T: Filterable>: Send + Sync {
    /// returns true if the item should be kept
    fn matches(&self, item: &T) -> bool;
}

/// keeps items scoring at or above the threshold
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    threshold: f64,
}

impl ThresholdFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl<T: Filterable> Filter<T> for ThresholdFilter {
    fn matches(&self, item: &T) -> bool {
        item.score() >= self.threshold
    }
}

/// filters out users whose id matches any of the given regex patterns
#[derive(Debug, Clone, Default)]
pub struct ExcludePatternFilter {
    patterns: Vec<Regex>,
}

impl ExcludePatternFilter {
    /// invalid patterns are dropped
    pub fn from_comma_separated(pattern_str: &str) -> Self {
        let patterns = pattern_str
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self { patterns }
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns_str(&self) -> String {
        self.patterns
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// drop excluded users, keeping order
    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        if self.patterns.is_empty() {
            return items;
        }
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

impl<T: Filterable> Filter<T> for ExcludePatternFilter {
    fn matches(&self, item: &T) -> bool {
        !self.patterns.iter().any(|p| p.is_match(item.user_id()))
    }
}
