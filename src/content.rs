//! content-based scoring: how close a user's purchase profile is to a product
//!
//! a user's profile is the mean feature vector of everything they bought. users
//! with no purchases have no profile and are left out of the ranking entirely.

use crate::dataset::{Catalog, PurchaseHistory};
use crate::filter::{Filter, ThresholdFilter};
use crate::providers::{ScoreError, Scorer};
use crate::scoring::{cosine_similarity, mean_vector, rank_descending, ScoreRecord};

pub struct ContentScorer<'a> {
    catalog: &'a Catalog,
    purchases: &'a PurchaseHistory,
}

impl<'a> ContentScorer<'a> {
    pub fn new(catalog: &'a Catalog, purchases: &'a PurchaseHistory) -> Self {
        Self { catalog, purchases }
    }

    /// mean feature vector over the user's purchases
    pub fn profile(&self, products: &[String]) -> Option<Vec<f64>> {
        mean_vector(products.iter().filter_map(|p| self.catalog.features(p)))
    }
}

impl Scorer for ContentScorer<'_> {
    fn score(&self, product: &str, threshold: f64) -> Result<Vec<ScoreRecord>, ScoreError> {
        let target = self
            .catalog
            .features(product)
            .ok_or_else(|| ScoreError::UnknownProduct(product.to_string()))?;
        let keep = ThresholdFilter::new(threshold);

        let mut ranked: Vec<ScoreRecord> = self
            .purchases
            .iter()
            .filter_map(|(user, bought)| match self.profile(bought) {
                Some(profile) => Some(ScoreRecord::new(user, cosine_similarity(&profile, target))),
                None => {
                    log::debug!("skipping {} for content scoring: no purchases", user);
                    None
                }
            })
            .filter(|r| keep.matches(r))
            .collect();

        rank_descending(&mut ranked);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "content-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{LIGHTENING_SERIES, MATTE_LIP_CREAM};
    use crate::dataset::{Dataset, PreferenceMatrix, Product, Purchases};

    fn ids(records: &[ScoreRecord]) -> Vec<&str> {
        records.iter().map(|r| r.user_id.as_str()).collect()
    }

    #[test]
    fn test_exact_profile_ranks_first() {
        let data = Dataset::sample();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        let ranked = scorer.score(LIGHTENING_SERIES, 0.7).unwrap();

        // U6 bought only the target, so its profile is the product vector itself
        assert_eq!(ranked[0].user_id, "U6");
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert_eq!(ids(&ranked), vec!["U6", "U1", "U5", "U7", "U9", "U4"]);
    }

    #[test]
    fn test_scores_are_sorted_and_above_threshold() {
        let data = Dataset::sample();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        let ranked = scorer.score(MATTE_LIP_CREAM, 0.8).unwrap();

        assert_eq!(ids(&ranked), vec!["U5", "U3", "U8"]);
        assert!(ranked.iter().all(|r| r.score >= 0.8 && r.score <= 1.0));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let data = Dataset::sample();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        for product in data.catalog.product_ids() {
            let thresholds = [0.0, 0.3, 0.5, 0.7, 0.85, 0.95];
            for pair in thresholds.windows(2) {
                let loose = scorer.score(product, pair[0]).unwrap();
                let strict = scorer.score(product, pair[1]).unwrap();
                let loose_ids = ids(&loose);
                assert!(strict.iter().all(|r| loose_ids.contains(&r.user_id.as_str())));
            }
        }
    }

    #[test]
    fn test_zero_threshold_scores_every_user() {
        let data = Dataset::sample();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        assert_eq!(scorer.score(LIGHTENING_SERIES, 0.0).unwrap().len(), 10);
    }

    #[test]
    fn test_unknown_product() {
        let data = Dataset::sample();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        assert_eq!(
            scorer.score("Wardah Nonexistent", 0.5),
            Err(ScoreError::UnknownProduct("Wardah Nonexistent".into()))
        );
    }

    #[test]
    fn test_user_without_purchases_is_skipped() {
        let catalog = Catalog::new(vec![
            Product {
                id: "a".into(),
                features: vec![1.0, 0.0],
            },
            Product {
                id: "b".into(),
                features: vec![0.0, 1.0],
            },
        ])
        .unwrap();
        let purchases = PurchaseHistory::new(vec![
            Purchases {
                user: "buyer".into(),
                products: vec!["a".into()],
            },
            Purchases {
                user: "browser".into(),
                products: vec![],
            },
        ]);
        let data = Dataset::new(
            catalog,
            purchases,
            PreferenceMatrix::new(vec![], vec![]).unwrap(),
        )
        .unwrap();
        let scorer = ContentScorer::new(&data.catalog, &data.purchases);

        let ranked = scorer.score("a", 0.0).unwrap();

        assert_eq!(ids(&ranked), vec!["buyer"]);
    }
}
