//! rank-position tiers for promotion
//!
//! ```text
//! top = n >= 3 ? floor(n * 0.3) : 1
//! mid = n >= 3 ? floor(n * 0.6) : 1
//!
//! high = [0, top)   medium = [top, mid)   low = [mid, n)
//! ```
//!
//! tiers follow rank position only, never the score value. short lists (n < 3) put the
//! first row in high, leave medium empty and send the rest to low. the cuts truncate
//! floating-point products, so n = 3 yields an empty high tier (3 * 0.3 < 1).

use serde::Serialize;

const HIGH_SHARE: f64 = 0.3;
const MEDIUM_SHARE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Buckets<T> {
    pub high: Vec<T>,
    pub medium: Vec<T>,
    pub low: Vec<T>,
}

/// (top_cut, mid_cut) for a ranked list of length n
pub fn cut_points(n: usize) -> (usize, usize) {
    if n < 3 {
        return (1.min(n), 1.min(n));
    }
    let top = (n as f64 * HIGH_SHARE) as usize;
    let mid = (n as f64 * MEDIUM_SHARE) as usize;
    (top, mid)
}

/// split a ranked list into high/medium/low tiers by position
pub fn bucketize<T: Clone>(ranked: &[T]) -> Buckets<T> {
    let (top, mid) = cut_points(ranked.len());
    Buckets {
        high: ranked[..top].to_vec(),
        medium: ranked[top..mid].to_vec(),
        low: ranked[mid..].to_vec(),
    }
}

/// the promotion step: nothing to promote when nobody qualified
pub fn promotion_strategy<T: Clone>(ranked: &[T]) -> Option<Buckets<T>> {
    if ranked.is_empty() {
        return None;
    }
    Some(bucketize(ranked))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes<T>(b: &Buckets<T>) -> (usize, usize, usize) {
        (b.high.len(), b.medium.len(), b.low.len())
    }

    #[test]
    fn test_ten_rows() {
        let ranked: Vec<u32> = (0..10).collect();
        let buckets = bucketize(&ranked);

        assert_eq!(sizes(&buckets), (3, 3, 4));
        assert_eq!(buckets.high, vec![0, 1, 2]);
        assert_eq!(buckets.medium, vec![3, 4, 5]);
        assert_eq!(buckets.low, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_two_rows_degenerate_split() {
        let buckets = bucketize(&["U1", "U6"]);

        assert_eq!(sizes(&buckets), (1, 0, 1));
        assert_eq!(buckets.high, vec!["U1"]);
        assert_eq!(buckets.low, vec!["U6"]);
    }

    #[test]
    fn test_single_row() {
        let buckets = bucketize(&["U6"]);
        assert_eq!(sizes(&buckets), (1, 0, 0));
    }

    #[test]
    fn test_three_rows_leave_high_empty() {
        let buckets = bucketize(&["U1", "U6", "U5"]);
        assert_eq!(sizes(&buckets), (0, 1, 2));
    }

    #[test]
    fn test_tiers_cover_every_row_in_order() {
        for n in 1..40usize {
            let ranked: Vec<usize> = (0..n).collect();
            let b = bucketize(&ranked);
            let rejoined: Vec<usize> = b
                .high
                .iter()
                .chain(&b.medium)
                .chain(&b.low)
                .copied()
                .collect();
            assert_eq!(rejoined, ranked, "n = {n}");
        }
    }

    #[test]
    fn test_cut_points() {
        assert_eq!(cut_points(5), (1, 3));
        assert_eq!(cut_points(6), (1, 3));
        assert_eq!(cut_points(12), (3, 7));
        assert_eq!(cut_points(0), (0, 0));
    }

    #[test]
    fn test_empty_input_skips_promotion() {
        assert_eq!(promotion_strategy::<u32>(&[]), None);
        assert!(promotion_strategy(&[1]).is_some());
    }
}
