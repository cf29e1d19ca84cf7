//! Error types for glasso-roc.

use thiserror::Error;

/// Error type for glasso-roc operations.
#[derive(Debug, Error)]
pub enum GlassoError {
    /// An argument was rejected before any work was done.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Numerical error (non-PSD covariance, failed inversion, non-finite values).
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Solver error (non-convergence, non-optimal QP status).
    #[error("Solver error: {0}")]
    SolverError(String),

    /// I/O error while exporting results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlassoError {
    /// Shape mismatch between two `rows x cols` pairs.
    pub(crate) fn shape(expected: (usize, usize), got: (usize, usize)) -> Self {
        GlassoError::ShapeMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            got: format!("{}x{}", got.0, got.1),
        }
    }
}

/// Result type for glasso-roc operations.
pub type Result<T> = std::result::Result<T, GlassoError>;
