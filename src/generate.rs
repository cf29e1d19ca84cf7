//! Synthetic Gaussian graphical models.
//!
//! Two ground-truth generators:
//! - [`random_precision`]: a random sparse, diagonally dominant precision
//!   matrix (positive definite by construction)
//! - [`markov_chain`]: the tridiagonal precision matrix of a chain graph
//!
//! Both return a [`GraphModel`] holding the precision matrix `theta` and the
//! covariance `sigma` used to parameterize sampling.

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GlassoError, Result};
use crate::sparse::{csc_symmetrize, csc_to_dense, offdiag_abs_row_sums, random_sparse};

/// Diagonal offset that lifts the smallest eigenvalue above zero.
pub const DIAGONAL_SHIFT: f64 = 0.5;

/// Off-diagonal coupling of the chain graph.
pub const CHAIN_COUPLING: f64 = 0.5;

/// Singular values below this (relative to the largest) are treated as zero
/// when pseudo-inverting.
const PINV_EPS: f64 = 1e-12;

/// Which ground-truth graph a trial generates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GraphKind {
    /// Random sparse graph with the given edge density.
    Random { sparsity: f64 },
    /// Chain graph: node i linked to i-1 and i+1.
    MarkovChain,
}

impl GraphKind {
    /// Generate a model of this kind with `p` variables.
    pub fn generate<R: Rng + ?Sized>(&self, p: usize, rng: &mut R) -> Result<GraphModel> {
        match *self {
            GraphKind::Random { sparsity } => random_precision(p, sparsity, rng),
            GraphKind::MarkovChain => markov_chain(p),
        }
    }
}

/// Ground truth of one trial.
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// Precision matrix (symmetric positive definite).
    pub theta: DMatrix<f64>,
    /// Covariance matrix, the (pseudo-)inverse of `theta`.
    pub sigma: DMatrix<f64>,
}

impl GraphModel {
    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.theta.nrows()
    }
}

fn validate_dim(p: usize) -> Result<()> {
    if p == 0 {
        return Err(GlassoError::InvalidArgument(
            "graph size p must be positive".into(),
        ));
    }
    Ok(())
}

/// Validate a sparsity level; must lie in `(0, 1]`.
pub fn validate_sparsity(sparsity: f64) -> Result<()> {
    if !(sparsity > 0.0 && sparsity <= 1.0) {
        return Err(GlassoError::InvalidArgument(format!(
            "sparsity must be in (0, 1], got {sparsity}"
        )));
    }
    Ok(())
}

/// Generate a random sparse precision matrix and its covariance.
///
/// The matrix `A` has independent nonzero entries with probability
/// `sparsity`; `theta = A + Aᵀ + diag(offdiag row sums) + 0.5 I`, which is
/// symmetric, diagonally dominant with nonnegative entries, and therefore
/// positive definite. `sigma` is the pseudo-inverse of `theta`.
///
/// # Errors
///
/// `InvalidArgument` for `p == 0` or sparsity outside `(0, 1]`;
/// `NumericalError` if the pseudo-inverse decomposition fails.
pub fn random_precision<R: Rng + ?Sized>(
    p: usize,
    sparsity: f64,
    rng: &mut R,
) -> Result<GraphModel> {
    validate_dim(p)?;
    validate_sparsity(sparsity)?;

    let a = csc_symmetrize(&random_sparse(p, p, sparsity, rng));
    let row_sums = offdiag_abs_row_sums(&a);

    let mut theta = csc_to_dense(&a);
    for (i, sum) in row_sums.iter().enumerate() {
        theta[(i, i)] += sum + DIAGONAL_SHIFT;
    }

    let sigma = theta
        .clone()
        .pseudo_inverse(PINV_EPS)
        .map_err(|e| GlassoError::NumericalError(format!("pseudo-inverse failed: {e}")))?;

    Ok(GraphModel { theta, sigma })
}

/// Generate the chain-graph precision matrix and its covariance.
///
/// `theta` is the identity with `0.5` on the first sub- and super-diagonal.
/// Its eigenvalues are `1 + cos(kπ/(p+1))`, so it is always invertible.
pub fn markov_chain(p: usize) -> Result<GraphModel> {
    validate_dim(p)?;

    let theta = DMatrix::from_fn(p, p, |i, j| {
        if i == j {
            1.0
        } else if i.abs_diff(j) == 1 {
            CHAIN_COUPLING
        } else {
            0.0
        }
    });

    let sigma = theta
        .clone()
        .try_inverse()
        .ok_or_else(|| GlassoError::NumericalError("chain precision matrix is singular".into()))?;

    Ok(GraphModel { theta, sigma })
}
