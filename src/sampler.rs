//! Multivariate normal sampling.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{GlassoError, Result};

/// Relative tolerance for symmetry and semidefiniteness checks.
const PSD_TOL: f64 = 1e-8;

/// A multivariate normal distribution `N(mean, cov)`, stored as the mean and
/// a factor `L` with `L Lᵀ = cov`.
#[derive(Debug, Clone)]
pub struct MultivariateNormal {
    mean: DVector<f64>,
    factor: DMatrix<f64>,
}

impl MultivariateNormal {
    /// Build a sampler.
    ///
    /// Positive-definite covariances are factored by Cholesky. Semidefinite
    /// ones fall back to an eigen factor with eigenvalues that are negative
    /// within tolerance clamped to zero.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the dimensions disagree; `NumericalError` if the
    /// covariance is non-finite, asymmetric, or not positive semidefinite.
    pub fn new(mean: DVector<f64>, cov: DMatrix<f64>) -> Result<Self> {
        let p = mean.len();
        if cov.shape() != (p, p) {
            return Err(GlassoError::shape((p, p), cov.shape()));
        }
        if cov.iter().any(|v| !v.is_finite()) || mean.iter().any(|v| !v.is_finite()) {
            return Err(GlassoError::NumericalError(
                "mean or covariance has non-finite entries".into(),
            ));
        }

        let scale = cov.amax().max(1.0);
        if (&cov - cov.transpose()).amax() > PSD_TOL * scale {
            return Err(GlassoError::NumericalError(
                "covariance is not symmetric".into(),
            ));
        }

        let factor = match cov.clone().cholesky() {
            Some(chol) => chol.l(),
            None => eigen_factor(cov, scale)?,
        };

        Ok(MultivariateNormal { mean, factor })
    }

    /// Zero-mean distribution with the given covariance.
    pub fn centered(cov: DMatrix<f64>) -> Result<Self> {
        Self::new(DVector::zeros(cov.nrows()), cov)
    }

    /// Dimension of the distribution.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Draw `n` i.i.d. samples as the rows of an `n × p` matrix.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> DMatrix<f64> {
        let p = self.dim();
        let z = DMatrix::<f64>::from_fn(n, p, |_, _| rng.sample(StandardNormal));
        let mut x = z * self.factor.transpose();
        for mut row in x.row_iter_mut() {
            row += self.mean.transpose();
        }
        x
    }
}

fn eigen_factor(cov: DMatrix<f64>, scale: f64) -> Result<DMatrix<f64>> {
    let eig = cov.symmetric_eigen();
    let min = eig.eigenvalues.min();
    if min < -PSD_TOL * scale {
        return Err(GlassoError::NumericalError(format!(
            "covariance is not positive semidefinite (min eigenvalue {min:.3e})"
        )));
    }
    let roots = eig.eigenvalues.map(|v| v.max(0.0).sqrt());
    Ok(eig.eigenvectors * DMatrix::from_diagonal(&roots))
}

/// Sample covariance of the rows of `x` (unbiased, `n − 1` denominator).
///
/// # Errors
///
/// `InvalidArgument` if there are fewer than two rows.
pub fn empirical_covariance(x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = x.nrows();
    if n < 2 {
        return Err(GlassoError::InvalidArgument(format!(
            "need at least 2 observations for a covariance, got {n}"
        )));
    }

    let means = x.row_mean();
    let mut centered = x.clone();
    for mut row in centered.row_iter_mut() {
        row -= &means;
    }

    let cov = centered.transpose() * &centered / (n as f64 - 1.0);
    // Average with the transpose to remove rounding asymmetry.
    Ok((&cov + cov.transpose()) * 0.5)
}
