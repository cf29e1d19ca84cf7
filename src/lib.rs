//! # glasso-roc
//!
//! Monte Carlo evaluation of how well the graphical lasso recovers the
//! sparsity pattern of a Gaussian graphical model.
//!
//! Each repetition draws a ground-truth precision matrix, samples from the
//! matching multivariate normal, estimates the precision matrix along a
//! regularization path with glasso, and scores every estimate against the
//! truth. Aggregated over repetitions this gives an ROC-style sweep of
//! true/false positive rates against the penalty.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glasso_roc::prelude::*;
//!
//! let config = ExperimentConfig::random(5, 1000, 0.25)
//!     .repetitions(20)
//!     .seed(42)
//!     .build()?;
//! let path = RegularizationPath::linspace(0.01, 0.2, 8)?;
//!
//! let result = run(&config, &path, &Glasso::default())?;
//! for row in &result.summaries {
//!     println!("rho={:.3} tpr={:.3} fpr={:.3}", row.rho, row.tpr.mean, row.fpr.mean);
//! }
//! ```
//!
//! ## Scoring convention
//!
//! The positive class is the *absent* edge: a true positive is an entry the
//! estimate sets to zero where the truth is zero too, a false positive is an
//! entry the estimate zeroes although the truth has an edge. See
//! [`scoring`].
//!
//! ## Architecture
//!
//! - **Generators** ([`generate`]): random diagonally dominant precision
//!   matrices built from nalgebra-sparse matrices, and the chain graph
//! - **Sampling** ([`sampler`]): multivariate normal draws and the empirical
//!   covariance
//! - **Solver** ([`solver`]): block coordinate descent glasso behind the
//!   [`PathSolver`](solver::PathSolver) trait, with a coordinate descent or
//!   Clarabel QP inner lasso
//! - **Evaluation** ([`scoring`], [`connectivity`]): rates and graph
//!   connectivity of each estimate
//! - **Driver** ([`experiment`], [`summary`], [`export`]): repetitions,
//!   aggregation, CSV output

pub mod connectivity;
pub mod error;
pub mod experiment;
pub mod export;
pub mod generate;
pub mod path;
pub mod sampler;
pub mod scoring;
pub mod solver;
pub mod sparse;
pub mod summary;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use glasso_roc::prelude::*;
/// ```
pub mod prelude {
    // Ground truth and sampling
    pub use crate::generate::{markov_chain, random_precision, GraphKind, GraphModel};
    pub use crate::sampler::{empirical_covariance, MultivariateNormal};

    // Solver
    pub use crate::path::RegularizationPath;
    pub use crate::solver::{
        Estimate, Glasso, LassoBackend, PathSolution, PathSolver, Settings, SolveStatus,
    };

    // Evaluation
    pub use crate::connectivity::{adjacency, connectivity, Connectivity};
    pub use crate::scoring::{score, EdgeScore};

    // Driver
    pub use crate::experiment::{
        aggregate, run, run_trial, sample_and_solve, ExperimentConfig, ExperimentResult,
        FailurePolicy, PathPoint, TrialRecord,
    };
    pub use crate::export::{write_path_csv, write_summary_csv};
    pub use crate::summary::{RateSummary, Summary};

    // Errors
    pub use crate::error::{GlassoError, Result};
}

// Re-export main types at crate root
pub use error::{GlassoError, Result};
pub use path::RegularizationPath;
pub use solver::{Glasso, PathSolver};
