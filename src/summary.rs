//! Aggregation of per-repetition rates.
//!
//! Quantiles interpolate linearly between order statistics: for sorted data
//! `x` of length `n` and probability `q`, `h = (n − 1) q` and
//! `Q(q) = x[⌊h⌋] + (h − ⌊h⌋)(x[⌊h⌋ + 1] − x[⌊h⌋])`.

use serde::{Deserialize, Serialize};

/// Lower quantile reported in summaries.
pub const LOWER_QUANTILE: f64 = 0.1;

/// Upper quantile reported in summaries.
pub const UPPER_QUANTILE: f64 = 0.9;

/// Mean and 10th/90th percentiles of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Sample mean.
    pub mean: f64,
    /// 10th percentile.
    pub q10: f64,
    /// 90th percentile.
    pub q90: f64,
}

impl Summary {
    /// Summarize `data`. Returns `None` for an empty sample.
    pub fn from_samples(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Summary {
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            q10: quantile_sorted(&sorted, LOWER_QUANTILE),
            q90: quantile_sorted(&sorted, UPPER_QUANTILE),
        })
    }
}

/// Quantile of already sorted data.
///
/// # Panics
///
/// Panics if `sorted` is empty or `q` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    assert!((0.0..=1.0).contains(&q), "Quantile probability must be in [0, 1]");

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Aggregated rates at one path position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    /// Penalty value.
    pub rho: f64,
    /// True-positive rate across repetitions.
    pub tpr: Summary,
    /// False-positive rate across repetitions.
    pub fpr: Summary,
    /// Connectivity indicator (1 connected, 2 disconnected) across
    /// repetitions, when recorded.
    pub connectivity: Option<Summary>,
    /// Fraction of repetitions whose estimate was connected, when recorded.
    pub connected_fraction: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&data, 0.0), 1.0);
        assert_eq!(quantile_sorted(&data, 1.0), 5.0);
        assert_eq!(quantile_sorted(&data, 0.5), 3.0);
        assert!((quantile_sorted(&data, 0.1) - 1.4).abs() < 1e-12);
        assert!((quantile_sorted(&data, 0.9) - 4.6).abs() < 1e-12);
    }

    #[test]
    fn test_summary_unsorted_input() {
        let s = Summary::from_samples(&[0.5, 0.0, 1.0]).unwrap();
        assert!((s.mean - 0.5).abs() < 1e-12);
        assert!((s.q10 - 0.1).abs() < 1e-12);
        assert!((s.q90 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample() {
        let s = Summary::from_samples(&[0.25]).unwrap();
        assert_eq!(s, Summary { mean: 0.25, q10: 0.25, q90: 0.25 });
    }

    #[test]
    fn test_empty_sample() {
        assert!(Summary::from_samples(&[]).is_none());
    }
}
