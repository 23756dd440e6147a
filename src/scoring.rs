//! vector math, ranking and blending shared by the scorers
//!
//! ## similarity
//!
//! ```text
//! cos(u, p) = dot(u, p) / (||u|| * ||p||)
//! ```
//!
//! user profiles are the element-wise mean of the feature vectors of everything
//! the user purchased.
//!
//! ## blending
//!
//! content and collaborative scores live on different scales, so the hybrid strategy
//! does not fuse them into one number. it takes a proportional slice from each ranked
//! list instead:
//!
//! ```text
//! n_content = max(1, floor(len(content) * ratio))
//! n_cf      = max(1, floor(len(cf) * (1 - ratio)))
//! ```
//!
//! the slices are concatenated content-first and a user may appear in both.

use serde::Serialize;
use std::cmp::Ordering;

/// one scored user in a ranked result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    #[serde(rename = "user")]
    pub user_id: String,
    pub score: f64,
}

impl ScoreRecord {
    pub fn new(user_id: impl Into<String>, score: f64) -> Self {
        Self {
            user_id: user_id.into(),
            score,
        }
    }
}

/// which strategy a blended row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    #[serde(rename = "Content-Based")]
    ContentBased,
    #[serde(rename = "Collaborative Filtering")]
    CollaborativeFiltering,
}

/// one row of a hybrid result; carries no score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlendedRecord {
    #[serde(rename = "user")]
    pub user_id: String,
    pub source: Source,
}

/// configuration for the hybrid blend
#[derive(Debug, Clone)]
pub struct BlendConfig {
    /// share of the content-based list to keep (0.0 = pure collaborative, 1.0 = pure content)
    pub content_ratio: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self { content_ratio: 0.7 }
    }
}

impl BlendConfig {
    pub fn new(content_ratio: f64) -> Self {
        Self { content_ratio }
    }

    /// rows to take from the content list
    pub fn content_take(&self, available: usize) -> usize {
        proportional_take(available, self.content_ratio)
    }

    /// rows to take from the collaborative list
    pub fn collaborative_take(&self, available: usize) -> usize {
        proportional_take(available, 1.0 - self.content_ratio)
    }
}

/// `max(1, floor(available * share))`; the floor of one still yields nothing from an empty list
#[inline]
fn proportional_take(available: usize, share: f64) -> usize {
    ((available as f64 * share) as usize).max(1)
}

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// cosine similarity in [-1, 1]; zero-length vectors score 0
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}

/// element-wise mean of the given vectors, `None` when there are none
pub fn mean_vector<'a, I>(vectors: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut iter = vectors.into_iter();
    let mut sum = iter.next()?.to_vec();
    let mut count = 1usize;

    for v in iter {
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
        count += 1;
    }

    let n = count as f64;
    sum.iter_mut().for_each(|x| *x /= n);
    Some(sum)
}

/// sort descending by score; equal scores keep their input order
pub fn rank_descending(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// take proportional slices of both ranked lists and concatenate them, content first
pub fn blend(
    content: &[ScoreRecord],
    collaborative: &[ScoreRecord],
    config: &BlendConfig,
) -> Vec<BlendedRecord> {
    let tag = |source: Source| {
        move |r: &ScoreRecord| BlendedRecord {
            user_id: r.user_id.clone(),
            source,
        }
    };

    content
        .iter()
        .take(config.content_take(content.len()))
        .map(tag(Source::ContentBased))
        .chain(
            collaborative
                .iter()
                .take(config.collaborative_take(collaborative.len()))
                .map(tag(Source::CollaborativeFiltering)),
        )
        .collect()
}
