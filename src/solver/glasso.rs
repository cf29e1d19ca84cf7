//! Block coordinate descent graphical lasso.
//!
//! Estimates a sparse precision matrix by maximizing the L1-penalized
//! Gaussian log-likelihood
//!
//! ```text
//! log det Θ − tr(SΘ) − ρ ‖Θ‖₁
//! ```
//!
//! The working covariance `W` starts at `S + ρI`. Each sweep visits every
//! column `j`, partitions `W` into the block `W₁₁` (all other rows and
//! columns) and the column `w₁₂`, solves the lasso
//!
//! ```text
//! minimize  ½ βᵀ W₁₁ β − s₁₂ᵀ β + ρ ‖β‖₁
//! ```
//!
//! and sets `w₁₂ = W₁₁ β`. After convergence each precision column is
//! recovered from its lasso coefficients: `θ₂₂ = 1 / (w₂₂ − w₁₂ᵀβ)` and
//! `θ₁₂ = −β θ₂₂`. Zero coefficients are exact zeros in the estimate.
//!
//! Along a path, `W` and the coefficients of the previous penalty seed the
//! next one.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::{clarabel, lasso, Estimate, LassoBackend, PathSolution, PathSolver, Settings};
use crate::error::{GlassoError, Result};
use crate::path::RegularizationPath;

/// Graphical lasso solver.
#[derive(Debug, Clone, Default)]
pub struct Glasso {
    settings: Settings,
}

/// State carried between consecutive penalties.
struct WarmStart {
    /// Working covariance.
    w: DMatrix<f64>,
    /// Column `j` holds the lasso coefficients for column `j`; the diagonal
    /// is unused.
    beta: DMatrix<f64>,
}

impl Glasso {
    /// Create a solver with the given settings.
    pub fn new(settings: Settings) -> Self {
        Glasso { settings }
    }

    /// The solver settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Solve for a single penalty from a cold start.
    pub fn solve(&self, s: &DMatrix<f64>, rho: f64) -> Result<Estimate> {
        validate_covariance(s)?;
        if !(rho.is_finite() && rho > 0.0) {
            return Err(GlassoError::InvalidArgument(format!(
                "penalty must be finite and positive, got {rho}"
            )));
        }
        let mut warm = WarmStart::cold(s);
        self.fit(s, rho, &mut warm)
    }

    fn fit(&self, s: &DMatrix<f64>, rho: f64, warm: &mut WarmStart) -> Result<Estimate> {
        let p = s.nrows();
        let shift = if self.settings.penalize_diagonal { rho } else { 0.0 };
        for i in 0..p {
            warm.w[(i, i)] = s[(i, i)] + shift;
        }

        let threshold = self.settings.tol * mean_abs_offdiag(s).unwrap_or(1.0);
        let mut sweeps = 0;
        let mut converged = p == 1;

        while !converged {
            if sweeps == self.settings.max_iter {
                return Err(GlassoError::SolverError(format!(
                    "glasso did not converge in {} sweeps (rho = {rho})",
                    self.settings.max_iter
                )));
            }
            sweeps += 1;

            let previous = warm.w.clone();
            for j in 0..p {
                self.update_column(s, rho, j, warm)?;
            }

            let change = (&warm.w - &previous).abs().mean();
            if !change.is_finite() {
                return Err(GlassoError::NumericalError(format!(
                    "working covariance diverged (rho = {rho})"
                )));
            }
            converged = change < threshold;
        }

        let precision = recover_precision(warm)?;
        debug!(rho, sweeps, "glasso converged");

        Ok(Estimate {
            rho,
            precision,
            covariance: warm.w.clone(),
            iterations: sweeps,
        })
    }

    fn update_column(
        &self,
        s: &DMatrix<f64>,
        rho: f64,
        j: usize,
        warm: &mut WarmStart,
    ) -> Result<()> {
        let others = others(warm.w.nrows(), j);
        let w11 = warm.w.select_rows(&others).select_columns(&others);
        let s12 = DVector::from_iterator(others.len(), others.iter().map(|&k| s[(k, j)]));
        let mut beta =
            DVector::from_iterator(others.len(), others.iter().map(|&k| warm.beta[(k, j)]));

        match self.settings.backend {
            LassoBackend::CoordinateDescent => {
                lasso::coordinate_descent(
                    &w11,
                    &s12,
                    rho,
                    &mut beta,
                    self.settings.inner_tol,
                    self.settings.inner_max_iter,
                )?;
            }
            LassoBackend::Clarabel => {
                clarabel::solve_lasso(&w11, &s12, rho, &mut beta, &self.settings)?;
            }
        }

        let w12 = &w11 * &beta;
        for (a, &k) in others.iter().enumerate() {
            warm.w[(k, j)] = w12[a];
            warm.w[(j, k)] = w12[a];
            warm.beta[(k, j)] = beta[a];
        }
        Ok(())
    }
}

impl PathSolver for Glasso {
    fn solve_path(&self, s: &DMatrix<f64>, path: &RegularizationPath) -> Result<PathSolution> {
        validate_covariance(s)?;

        let mut warm = WarmStart::cold(s);
        let estimates = path
            .iter()
            .map(|rho| self.fit(s, rho, &mut warm))
            .collect::<Result<Vec<_>>>()?;

        Ok(PathSolution { estimates })
    }
}

impl WarmStart {
    fn cold(s: &DMatrix<f64>) -> Self {
        let p = s.nrows();
        WarmStart {
            w: s.clone(),
            beta: DMatrix::zeros(p, p),
        }
    }
}

fn validate_covariance(s: &DMatrix<f64>) -> Result<()> {
    if !s.is_square() {
        return Err(GlassoError::shape((s.nrows(), s.nrows()), s.shape()));
    }
    if s.nrows() == 0 {
        return Err(GlassoError::InvalidArgument(
            "empirical covariance is empty".into(),
        ));
    }
    if s.iter().any(|v| !v.is_finite()) {
        return Err(GlassoError::NumericalError(
            "empirical covariance has non-finite entries".into(),
        ));
    }
    Ok(())
}

fn others(p: usize, j: usize) -> Vec<usize> {
    (0..p).filter(|&k| k != j).collect()
}

/// Mean absolute off-diagonal entry, or `None` when it is zero (diagonal or
/// 1×1 input).
fn mean_abs_offdiag(s: &DMatrix<f64>) -> Option<f64> {
    let p = s.nrows();
    if p < 2 {
        return None;
    }
    let total: f64 = (0..p)
        .flat_map(|i| (0..p).map(move |j| (i, j)))
        .filter(|(i, j)| i != j)
        .map(|(i, j)| s[(i, j)].abs())
        .sum();
    let mean = total / (p * (p - 1)) as f64;
    (mean > 0.0).then_some(mean)
}

fn recover_precision(warm: &WarmStart) -> Result<DMatrix<f64>> {
    let p = warm.w.nrows();
    let mut theta = DMatrix::zeros(p, p);

    for j in 0..p {
        let mut schur = warm.w[(j, j)];
        for k in others(p, j) {
            schur -= warm.w[(k, j)] * warm.beta[(k, j)];
        }
        if !(schur > 0.0 && schur.is_finite()) {
            return Err(GlassoError::SolverError(format!(
                "non-positive Schur complement {schur:.3e} in column {j}"
            )));
        }

        let theta_jj = 1.0 / schur;
        theta[(j, j)] = theta_jj;
        for k in others(p, j) {
            theta[(k, j)] = -warm.beta[(k, j)] * theta_jj;
        }
    }
    Ok(theta)
}
