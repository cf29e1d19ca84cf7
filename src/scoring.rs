//! Sparsity-pattern scoring of precision estimates.
//!
//! An off-diagonal entry is *null* when its magnitude is below the threshold.
//! The positive class is the absent edge: a true positive is an entry that is
//! null in both the estimate and the ground truth, a false positive is an
//! entry the estimate nulls although the ground truth has an edge there.
//!
//! ```text
//! P   = null off-diagonal entries of Θ
//! N   = non-null entries of Θ − p
//! tpr = TP / max(1, P)
//! fpr = FP / max(1, N)
//! ```

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{GlassoError, Result};

/// Counts and rates for one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeScore {
    /// Entries null in both estimate and ground truth.
    pub true_positives: usize,
    /// Entries null in the estimate but not in the ground truth.
    pub false_positives: usize,
    /// Null off-diagonal entries of the ground truth.
    pub positives: usize,
    /// Non-null entries of the ground truth, diagonal excluded.
    pub negatives: usize,
}

impl EdgeScore {
    /// `TP / max(1, P)`.
    pub fn true_positive_rate(&self) -> f64 {
        self.true_positives as f64 / self.positives.max(1) as f64
    }

    /// `FP / max(1, N)`.
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positives as f64 / self.negatives.max(1) as f64
    }
}

/// Score `estimate` against the ground-truth precision matrix `theta`.
///
/// # Errors
///
/// `ShapeMismatch` if the matrices differ in shape or are not square;
/// `InvalidArgument` if `threshold` is negative or NaN.
pub fn score(theta: &DMatrix<f64>, estimate: &DMatrix<f64>, threshold: f64) -> Result<EdgeScore> {
    if !theta.is_square() {
        return Err(GlassoError::shape((theta.nrows(), theta.nrows()), theta.shape()));
    }
    if estimate.shape() != theta.shape() {
        return Err(GlassoError::shape(theta.shape(), estimate.shape()));
    }
    if !(threshold >= 0.0) {
        return Err(GlassoError::InvalidArgument(format!(
            "threshold must be non-negative, got {threshold}"
        )));
    }

    let p = theta.nrows();
    let is_null = |x: f64| x.abs() < threshold;

    let non_null_total = theta.iter().filter(|&&x| !is_null(x)).count();
    let mut score = EdgeScore {
        true_positives: 0,
        false_positives: 0,
        positives: 0,
        negatives: non_null_total.saturating_sub(p),
    };

    for j in 0..p {
        for i in (0..p).filter(|&i| i != j) {
            let truth_null = is_null(theta[(i, j)]);
            let est_null = is_null(estimate[(i, j)]);
            if truth_null {
                score.positives += 1;
            }
            match (est_null, truth_null) {
                (true, true) => score.true_positives += 1,
                (true, false) => score.false_positives += 1,
                _ => {}
            }
        }
    }

    Ok(score)
}
