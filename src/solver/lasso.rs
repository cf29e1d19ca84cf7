//! Coordinate descent for the glasso inner lasso problem.
//!
//! Solves
//!
//! ```text
//! minimize  ½ βᵀ V β − uᵀ β + ρ ‖β‖₁
//! ```
//!
//! for symmetric positive semidefinite `V` with a positive diagonal.

use nalgebra::{DMatrix, DVector};

use crate::error::{GlassoError, Result};

/// Soft-thresholding operator `sign(x) · max(|x| − t, 0)`.
pub fn soft_threshold(x: f64, t: f64) -> f64 {
    if x > t {
        x - t
    } else if x < -t {
        x + t
    } else {
        0.0
    }
}

/// Run cyclic coordinate descent from `beta` until the largest coordinate
/// update falls below `tol`. Returns the number of sweeps.
///
/// # Errors
///
/// `NumericalError` if a diagonal entry of `v` is not positive;
/// `SolverError` if `max_iter` sweeps do not converge.
pub fn coordinate_descent(
    v: &DMatrix<f64>,
    u: &DVector<f64>,
    rho: f64,
    beta: &mut DVector<f64>,
    tol: f64,
    max_iter: u32,
) -> Result<u32> {
    let m = u.len();
    if let Some(k) = (0..m).find(|&k| !(v[(k, k)] > 0.0)) {
        return Err(GlassoError::NumericalError(format!(
            "lasso diagonal entry {k} is not positive ({})",
            v[(k, k)]
        )));
    }

    for sweep in 1..=max_iter {
        let mut max_delta = 0.0_f64;
        for k in 0..m {
            // Partial residual excluding coordinate k.
            let vk_beta = v.column(k).dot(&*beta) - v[(k, k)] * beta[k];
            let updated = soft_threshold(u[k] - vk_beta, rho) / v[(k, k)];
            max_delta = max_delta.max((updated - beta[k]).abs());
            beta[k] = updated;
        }
        if !max_delta.is_finite() {
            return Err(GlassoError::NumericalError(
                "lasso coordinate update is not finite".into(),
            ));
        }
        if max_delta < tol {
            return Ok(sweep);
        }
    }

    Err(GlassoError::SolverError(format!(
        "lasso coordinate descent did not converge in {max_iter} sweeps (rho = {rho})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(-1.0, 1.0), 0.0);
    }

    #[test]
    fn test_identity_design_is_soft_threshold() {
        let v = DMatrix::identity(3, 3);
        let u = DVector::from_vec(vec![2.0, -0.3, -1.5]);
        let mut beta = DVector::zeros(3);
        coordinate_descent(&v, &u, 0.5, &mut beta, 1e-10, 100).unwrap();
        assert!((beta[0] - 1.5).abs() < 1e-12);
        assert_eq!(beta[1], 0.0);
        assert!((beta[2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_penalty_solves_linear_system() {
        let v = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let u = DVector::from_vec(vec![1.0, 1.0]);
        let mut beta = DVector::zeros(2);
        coordinate_descent(&v, &u, 0.0, &mut beta, 1e-12, 10_000).unwrap();
        let residual = &v * &beta - &u;
        assert!(residual.amax() < 1e-9);
    }

    #[test]
    fn test_large_penalty_gives_zero() {
        let v = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let u = DVector::from_vec(vec![0.4, -0.2]);
        let mut beta = DVector::from_vec(vec![1.0, 1.0]);
        coordinate_descent(&v, &u, 1.0, &mut beta, 1e-12, 100).unwrap();
        assert_eq!(beta, DVector::zeros(2));
    }

    #[test]
    fn test_nonpositive_diagonal_rejected() {
        let v = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 1.0]);
        let u = DVector::zeros(2);
        let mut beta = DVector::zeros(2);
        assert!(matches!(
            coordinate_descent(&v, &u, 0.1, &mut beta, 1e-8, 10),
            Err(GlassoError::NumericalError(_))
        ));
    }
}
