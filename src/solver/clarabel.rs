//! Clarabel backend for the glasso inner lasso.
//!
//! The lasso `½ βᵀVβ − uᵀβ + ρ‖β‖₁` is posed as a QP over `x = [β; t]`:
//!
//! ```text
//! minimize    ½ βᵀ V β − uᵀ β + ρ 1ᵀ t
//! subject to  β − t ≤ 0
//!            −β − t ≤ 0
//! ```
//!
//! and handed to the Clarabel interior-point solver.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use nalgebra::{DMatrix, DVector};

use super::Settings;
use crate::error::{GlassoError, Result};
use crate::sparse::csc_from_triplets;

/// Coefficients with magnitude below this are reported as exact zeros; the
/// interior-point iterate never lands on zero itself.
const QP_ZERO_TOL: f64 = 1e-6;

/// Status reported by the QP solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Maximum iterations or time reached.
    MaxIterations,
    /// Numerical difficulties.
    NumericalError,
    /// Unknown status.
    Unknown,
}

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => SolveStatus::Optimal,
            SolverStatus::PrimalInfeasible => SolveStatus::Infeasible,
            SolverStatus::DualInfeasible => SolveStatus::Unbounded,
            SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::MaxIterations,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
                SolveStatus::NumericalError
            }
            _ => SolveStatus::Unknown,
        }
    }
}

/// Solve the lasso subproblem with Clarabel, writing the result into `beta`.
///
/// Returns the number of interior-point iterations.
///
/// # Errors
///
/// `SolverError` if Clarabel does not report an optimal solution.
pub fn solve_lasso(
    v: &DMatrix<f64>,
    u: &DVector<f64>,
    rho: f64,
    beta: &mut DVector<f64>,
    settings: &Settings,
) -> Result<u32> {
    let m = u.len();
    if m == 0 {
        return Ok(0);
    }

    // P holds V in the upper-left block, upper triangle only.
    let p_triplets = (0..m)
        .flat_map(|c| (0..=c).map(move |r| (r, c)))
        .filter(|&(r, c)| v[(r, c)] != 0.0)
        .map(|(r, c)| (r, c, v[(r, c)]));
    let p = to_clarabel_csc(&csc_from_triplets(2 * m, 2 * m, p_triplets));

    let q: Vec<f64> = u
        .iter()
        .map(|ui| -ui)
        .chain(std::iter::repeat(rho).take(m))
        .collect();

    // Rows 0..m: β − t ≤ 0. Rows m..2m: −β − t ≤ 0.
    let a_triplets = (0..m).flat_map(|k| {
        [
            (k, k, 1.0),
            (k, m + k, -1.0),
            (m + k, k, -1.0),
            (m + k, m + k, -1.0),
        ]
    });
    let a = to_clarabel_csc(&csc_from_triplets(2 * m, 2 * m, a_triplets));
    let b = vec![0.0; 2 * m];
    let cones = [SupportedConeT::NonnegativeConeT(2 * m)];

    let clarabel_settings = DefaultSettingsBuilder::default()
        .verbose(settings.verbose)
        .max_iter(settings.inner_max_iter)
        .tol_gap_abs(settings.tol_gap_abs)
        .tol_gap_rel(settings.tol_gap_rel)
        .build()
        .map_err(|e| GlassoError::SolverError(format!("invalid Clarabel settings: {e:?}")))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, clarabel_settings);
    solver.solve();

    let status: SolveStatus = solver.solution.status.into();
    if status != SolveStatus::Optimal {
        return Err(GlassoError::SolverError(format!(
            "lasso QP finished with status {status:?} (rho = {rho})"
        )));
    }

    for (k, x) in solver.solution.x.iter().take(m).enumerate() {
        beta[k] = if x.abs() < QP_ZERO_TOL { 0.0 } else { *x };
    }
    Ok(solver.info.iterations)
}

/// Convert nalgebra CSC to Clarabel CSC.
fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SolveStatus::from(SolverStatus::Solved), SolveStatus::Optimal);
        assert_eq!(
            SolveStatus::from(SolverStatus::MaxTime),
            SolveStatus::MaxIterations
        );
        assert_eq!(
            SolveStatus::from(SolverStatus::PrimalInfeasible),
            SolveStatus::Infeasible
        );
    }

    #[test]
    fn test_identity_design_matches_soft_threshold() {
        let v = DMatrix::identity(3, 3);
        let u = DVector::from_vec(vec![2.0, -0.3, -1.5]);
        let mut beta = DVector::zeros(3);
        solve_lasso(&v, &u, 0.5, &mut beta, &Settings::default()).unwrap();
        assert!((beta[0] - 1.5).abs() < 1e-5);
        assert_eq!(beta[1], 0.0);
        assert!((beta[2] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_problem() {
        let mut beta = DVector::zeros(0);
        let iters = solve_lasso(
            &DMatrix::zeros(0, 0),
            &DVector::zeros(0),
            0.1,
            &mut beta,
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(iters, 0);
    }
}
