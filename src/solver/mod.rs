//! Graphical lasso path solver.
//!
//! This module provides:
//! - The [`PathSolver`] interface consumed by the Monte Carlo driver
//! - A block coordinate descent glasso ([`Glasso`]) with path warm starts
//! - Two inner lasso backends: coordinate descent and a Clarabel QP

pub mod clarabel;
pub mod glasso;
pub mod lasso;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::RegularizationPath;

pub use self::clarabel::SolveStatus;
pub use self::glasso::Glasso;

/// Estimates a sparse precision matrix for every value of a
/// regularization path.
pub trait PathSolver: Send + Sync {
    /// Solve for each penalty in `path`, returning estimates in path order.
    fn solve_path(&self, s: &DMatrix<f64>, path: &RegularizationPath) -> Result<PathSolution>;
}

/// Inner lasso solver used by each glasso column update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LassoBackend {
    /// Cyclic coordinate descent with soft thresholding.
    #[default]
    CoordinateDescent,
    /// Quadratic program solved by Clarabel.
    Clarabel,
}

/// Solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Outer convergence threshold, relative to the mean absolute
    /// off-diagonal of the empirical covariance.
    pub tol: f64,
    /// Maximum outer sweeps per path value.
    pub max_iter: u32,
    /// Inner lasso convergence tolerance (coordinate descent).
    pub inner_tol: f64,
    /// Maximum inner iterations (sweeps or interior-point steps).
    pub inner_max_iter: u32,
    /// Add the penalty to the diagonal of the working covariance.
    pub penalize_diagonal: bool,
    /// Inner lasso backend.
    pub backend: LassoBackend,
    /// Print QP solver output.
    pub verbose: bool,
    /// QP absolute gap tolerance.
    pub tol_gap_abs: f64,
    /// QP relative gap tolerance.
    pub tol_gap_rel: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tol: 1e-4,
            max_iter: 10_000,
            inner_tol: 1e-6,
            inner_max_iter: 10_000,
            penalize_diagonal: true,
            backend: LassoBackend::CoordinateDescent,
            verbose: false,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
        }
    }
}

/// Estimate at one path position.
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Penalty value.
    pub rho: f64,
    /// Estimated precision matrix.
    pub precision: DMatrix<f64>,
    /// Estimated covariance matrix (the working matrix `W`).
    pub covariance: DMatrix<f64>,
    /// Outer sweeps until convergence.
    pub iterations: u32,
}

/// Estimates for a whole path, indexed by path position.
#[derive(Debug, Clone)]
pub struct PathSolution {
    /// One estimate per path value, in path order.
    pub estimates: Vec<Estimate>,
}

impl PathSolution {
    /// Estimate at path position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Estimate> {
        self.estimates.get(idx)
    }

    /// Number of path positions.
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// True if the solution holds no estimates.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Iterate over the estimates in path order.
    pub fn iter(&self) -> std::slice::Iter<'_, Estimate> {
        self.estimates.iter()
    }
}

impl std::ops::Index<usize> for PathSolution {
    type Output = DMatrix<f64>;

    /// Precision matrix at path position `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    fn index(&self, idx: usize) -> &DMatrix<f64> {
        &self.estimates[idx].precision
    }
}
