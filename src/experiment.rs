//! Monte Carlo evaluation of sparsity recovery.
//!
//! One repetition generates a ground-truth model, draws `n` zero-mean
//! samples, forms the empirical covariance, solves the whole regularization
//! path and scores every estimate. Repetitions return a [`TrialRecord`];
//! [`aggregate`] turns records into per-path-position summaries.
//!
//! Repetition `i` draws from its own RNG seeded from `(seed, i)`, so results
//! do not depend on execution order and the `parallel` feature reproduces
//! sequential runs exactly.
//!
//! ```ignore
//! use glasso_roc::prelude::*;
//!
//! let config = ExperimentConfig::random(20, 200, 0.1)
//!     .repetitions(50)
//!     .seed(7)
//!     .build()?;
//! let path = RegularizationPath::geometric(0.005, 0.5, 10)?;
//! let result = run(&config, &path, &Glasso::default())?;
//! for row in &result.summaries {
//!     println!("{:.3} {:.3} {:.3}", row.rho, row.tpr.mean, row.fpr.mean);
//! }
//! ```

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::connectivity::{connectivity, Connectivity};
use crate::error::{GlassoError, Result};
use crate::generate::{validate_sparsity, GraphKind, GraphModel};
use crate::path::RegularizationPath;
use crate::sampler::{empirical_covariance, MultivariateNormal};
use crate::scoring::{score, EdgeScore};
use crate::solver::{PathSolution, PathSolver};
use crate::summary::{RateSummary, Summary};

/// What to do when a repetition fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Abort the run with the first error.
    #[default]
    Abort,
    /// Log the failure, drop the repetition, and continue.
    SkipAndLog,
}

/// Parameters of a Monte Carlo experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Ground-truth graph.
    pub graph: GraphKind,
    /// Number of variables.
    pub p: usize,
    /// Observations per repetition.
    pub n: usize,
    /// Number of repetitions.
    pub repetitions: usize,
    /// Entries below this magnitude count as absent edges when scoring.
    pub threshold: f64,
    /// Entries above this magnitude count as edges for connectivity.
    pub connectivity_threshold: f64,
    /// Record the connectivity of every estimate.
    pub record_connectivity: bool,
    /// Base seed; repetition seeds derive from it.
    pub seed: u64,
    /// Failure handling.
    pub failure_policy: FailurePolicy,
}

impl ExperimentConfig {
    /// Random sparse graphs with `p` variables, `n` observations and edge
    /// density `sparsity`.
    pub fn random(p: usize, n: usize, sparsity: f64) -> ExperimentBuilder {
        ExperimentBuilder::new(GraphKind::Random { sparsity }, p, n, false)
    }

    /// The `p`-node chain graph with `n` observations. Connectivity is
    /// recorded by default.
    pub fn markov_chain(p: usize, n: usize) -> ExperimentBuilder {
        ExperimentBuilder::new(GraphKind::MarkovChain, p, n, true)
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        if self.p == 0 {
            return Err(GlassoError::InvalidArgument(
                "graph size p must be positive".into(),
            ));
        }
        if self.n < 2 {
            return Err(GlassoError::InvalidArgument(format!(
                "need at least 2 observations per repetition, got {}",
                self.n
            )));
        }
        if self.repetitions == 0 {
            return Err(GlassoError::InvalidArgument(
                "repetition count must be positive".into(),
            ));
        }
        if let GraphKind::Random { sparsity } = self.graph {
            validate_sparsity(sparsity)?;
        }
        for (name, value) in [
            ("threshold", self.threshold),
            ("connectivity threshold", self.connectivity_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GlassoError::InvalidArgument(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`ExperimentConfig`].
#[derive(Debug, Clone)]
pub struct ExperimentBuilder {
    config: ExperimentConfig,
}

impl ExperimentBuilder {
    fn new(graph: GraphKind, p: usize, n: usize, record_connectivity: bool) -> Self {
        ExperimentBuilder {
            config: ExperimentConfig {
                graph,
                p,
                n,
                repetitions: 100,
                threshold: 1e-4,
                connectivity_threshold: 1e-4,
                record_connectivity,
                seed: 0,
                failure_policy: FailurePolicy::Abort,
            },
        }
    }

    /// Number of repetitions (default 100).
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.config.repetitions = repetitions;
        self
    }

    /// Base seed (default 0).
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Scoring threshold (default `1e-4`).
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Connectivity threshold (default `1e-4`).
    pub fn connectivity_threshold(mut self, threshold: f64) -> Self {
        self.config.connectivity_threshold = threshold;
        self
    }

    /// Record connectivity of every estimate. On by default for the chain.
    pub fn record_connectivity(mut self, record: bool) -> Self {
        self.config.record_connectivity = record;
        self
    }

    /// Failure handling (default [`FailurePolicy::Abort`]).
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<ExperimentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Result of one estimate within a repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Penalty value of the estimate.
    pub rho: f64,
    /// Raw counts behind the rates.
    pub score: EdgeScore,
    /// True-positive rate.
    pub tpr: f64,
    /// False-positive rate.
    pub fpr: f64,
    /// Connectivity of the estimate, when recorded.
    pub connectivity: Option<Connectivity>,
}

/// Outcome of one repetition, one point per path position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Repetition index.
    pub repetition: usize,
    /// One point per path value, in path order.
    pub points: Vec<PathPoint>,
}

/// Outcome of a whole Monte Carlo run.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    /// Successful repetitions, sorted by repetition index.
    pub records: Vec<TrialRecord>,
    /// Repetitions dropped under [`FailurePolicy::SkipAndLog`].
    pub failed: usize,
    /// Per-path-position aggregates.
    pub summaries: Vec<RateSummary>,
}

/// Seed of repetition `index`: SplitMix64 finalizer over the base seed and
/// the index, so neighbouring repetitions get unrelated streams.
pub fn repetition_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Run one repetition and solve the path, returning the raw estimates.
///
/// Exposed for callers that want the matrices themselves, such as the
/// CSV dump of a chain experiment.
pub fn sample_and_solve<S: PathSolver + ?Sized>(
    config: &ExperimentConfig,
    path: &RegularizationPath,
    solver: &S,
    repetition: usize,
) -> Result<(GraphModel, PathSolution)> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(repetition_seed(config.seed, repetition as u64));

    let model = config.graph.generate(config.p, &mut rng)?;
    let sampler = MultivariateNormal::centered(model.sigma.clone())?;
    let x = sampler.sample(config.n, &mut rng);
    let s = empirical_covariance(&x)?;

    let solution = solver.solve_path(&s, path)?;
    if solution.len() != path.len() {
        return Err(GlassoError::SolverError(format!(
            "solver returned {} estimates for a path of {}",
            solution.len(),
            path.len()
        )));
    }
    Ok((model, solution))
}

/// Run and score a single repetition.
pub fn run_trial<S: PathSolver + ?Sized>(
    config: &ExperimentConfig,
    path: &RegularizationPath,
    solver: &S,
    repetition: usize,
) -> Result<TrialRecord> {
    let (model, solution) = sample_and_solve(config, path, solver, repetition)?;

    let points = solution
        .iter()
        .map(|est| {
            let score = score(&model.theta, &est.precision, config.threshold)?;
            let connectivity = if config.record_connectivity {
                Some(connectivity(&est.precision, config.connectivity_threshold)?)
            } else {
                None
            };
            Ok(PathPoint {
                rho: est.rho,
                tpr: score.true_positive_rate(),
                fpr: score.false_positive_rate(),
                score,
                connectivity,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(repetition, points = points.len(), "trial scored");
    Ok(TrialRecord { repetition, points })
}

/// Run the full Monte Carlo experiment.
///
/// # Errors
///
/// Configuration errors are reported before any sampling. Trial errors abort
/// the run under [`FailurePolicy::Abort`]; under
/// [`FailurePolicy::SkipAndLog`] the run fails only if every repetition
/// failed.
pub fn run<S: PathSolver + ?Sized>(
    config: &ExperimentConfig,
    path: &RegularizationPath,
    solver: &S,
) -> Result<ExperimentResult> {
    config.validate()?;
    info!(
        p = config.p,
        n = config.n,
        repetitions = config.repetitions,
        path_len = path.len(),
        "starting Monte Carlo run"
    );

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<TrialRecord>> = (0..config.repetitions)
        .into_par_iter()
        .map(|i| run_trial(config, path, solver, i))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes = (0..config.repetitions).map(|i| run_trial(config, path, solver, i));

    let mut records = Vec::with_capacity(config.repetitions);
    let mut failed = 0;
    let mut last_error = None;
    for (i, outcome) in outcomes.into_iter().enumerate() {
        match (outcome, config.failure_policy) {
            (Ok(record), _) => records.push(record),
            (Err(e), FailurePolicy::Abort) => return Err(e),
            (Err(e), FailurePolicy::SkipAndLog) => {
                warn!(repetition = i, error = %e, "skipping failed repetition");
                failed += 1;
                last_error = Some(e);
            }
        }
    }

    if records.is_empty() {
        return Err(last_error.unwrap_or_else(|| {
            GlassoError::InvalidArgument("no repetitions were run".into())
        }));
    }

    let summaries = aggregate(&records)?;
    info!(
        succeeded = records.len(),
        failed, "Monte Carlo run finished"
    );

    Ok(ExperimentResult {
        records,
        failed,
        summaries,
    })
}

/// Summarize records per path position.
///
/// Connectivity is summarized only at positions where every record
/// carries it.
///
/// # Errors
///
/// Every record must come from the same path: a record with a different
/// number of points is a `ShapeMismatch`, one with a different penalty at
/// some position is an `InvalidArgument`.
pub fn aggregate(records: &[TrialRecord]) -> Result<Vec<RateSummary>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let len = first.points.len();

    for record in &records[1..] {
        if record.points.len() != len {
            return Err(GlassoError::ShapeMismatch {
                expected: format!("{len} path points"),
                got: format!(
                    "{} in repetition {}",
                    record.points.len(),
                    record.repetition
                ),
            });
        }
        let same_path = first
            .points
            .iter()
            .zip(&record.points)
            .all(|(a, b)| a.rho == b.rho);
        if !same_path {
            return Err(GlassoError::InvalidArgument(format!(
                "repetition {} was solved on a different path than repetition {}",
                record.repetition, first.repetition
            )));
        }
    }

    let mut summaries = Vec::with_capacity(len);
    for (k, point) in first.points.iter().enumerate() {
        let points: Vec<&PathPoint> = records.iter().map(|r| &r.points[k]).collect();
        let tprs: Vec<f64> = points.iter().map(|pt| pt.tpr).collect();
        let fprs: Vec<f64> = points.iter().map(|pt| pt.fpr).collect();

        let indicators: Option<Vec<f64>> = points
            .iter()
            .map(|pt| pt.connectivity.map(|c| f64::from(c.indicator())))
            .collect();
        let connected_fraction = indicators.as_ref().map(|ind| {
            ind.iter().filter(|&&v| v == 1.0).count() as f64 / ind.len() as f64
        });

        // Non-empty: `records` has at least one entry.
        let (Some(tpr), Some(fpr)) = (Summary::from_samples(&tprs), Summary::from_samples(&fprs))
        else {
            continue;
        };
        summaries.push(RateSummary {
            rho: point.rho,
            tpr,
            fpr,
            connectivity: indicators.as_deref().and_then(Summary::from_samples),
            connected_fraction,
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Estimate, Glasso};
    use nalgebra::DMatrix;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Solver that returns a fixed matrix for every path value.
    struct FixedSolver(DMatrix<f64>);

    impl PathSolver for FixedSolver {
        fn solve_path(&self, _s: &DMatrix<f64>, path: &RegularizationPath) -> Result<PathSolution> {
            Ok(PathSolution {
                estimates: path
                    .iter()
                    .map(|rho| Estimate {
                        rho,
                        precision: self.0.clone(),
                        covariance: self.0.clone(),
                        iterations: 0,
                    })
                    .collect(),
            })
        }
    }

    /// Solver that always fails.
    struct FailingSolver;

    impl PathSolver for FailingSolver {
        fn solve_path(&self, _s: &DMatrix<f64>, _path: &RegularizationPath) -> Result<PathSolution> {
            Err(GlassoError::SolverError("no convergence".into()))
        }
    }

    /// Solver that fails on every odd-numbered call and otherwise returns
    /// the identity.
    struct AlternatingSolver {
        calls: AtomicUsize,
    }

    impl PathSolver for AlternatingSolver {
        fn solve_path(&self, s: &DMatrix<f64>, path: &RegularizationPath) -> Result<PathSolution> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                return Err(GlassoError::SolverError("no convergence".into()));
            }
            FixedSolver(DMatrix::identity(s.nrows(), s.ncols())).solve_path(s, path)
        }
    }

    #[test]
    fn test_builder_validation() {
        assert!(ExperimentConfig::random(0, 10, 0.5).build().is_err());
        assert!(ExperimentConfig::random(5, 1, 0.5).build().is_err());
        assert!(ExperimentConfig::random(5, 10, 0.0).build().is_err());
        assert!(ExperimentConfig::random(5, 10, 0.5).repetitions(0).build().is_err());
        assert!(ExperimentConfig::random(5, 10, 0.5).threshold(-1.0).build().is_err());
        let config = ExperimentConfig::markov_chain(5, 10).build().unwrap();
        assert!(config.record_connectivity);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_repetition_seeds_differ() {
        assert_ne!(repetition_seed(0, 0), repetition_seed(0, 1));
        assert_ne!(repetition_seed(0, 0), repetition_seed(1, 0));
        assert_eq!(repetition_seed(9, 3), repetition_seed(9, 3));
    }

    #[test]
    fn test_identity_estimates_on_chain() {
        let config = ExperimentConfig::markov_chain(4, 50)
            .repetitions(3)
            .build()
            .unwrap();
        let path = RegularizationPath::new([0.1, 0.2]).unwrap();
        let result = run(&config, &path, &FixedSolver(DMatrix::identity(4, 4))).unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.summaries.len(), 2);
        for row in &result.summaries {
            assert_eq!(row.tpr.mean, 1.0);
            assert_eq!(row.fpr.mean, 1.0);
            assert_eq!(row.connected_fraction, Some(0.0));
            assert_eq!(row.connectivity.unwrap().mean, 2.0);
        }
    }

    #[test]
    fn test_abort_policy_propagates() {
        let config = ExperimentConfig::random(4, 20, 0.5)
            .repetitions(2)
            .build()
            .unwrap();
        let path = RegularizationPath::new([0.1]).unwrap();
        assert!(matches!(
            run(&config, &path, &FailingSolver),
            Err(GlassoError::SolverError(_))
        ));
    }

    #[test]
    fn test_skip_policy_fails_when_everything_fails() {
        let config = ExperimentConfig::random(4, 20, 0.5)
            .repetitions(2)
            .failure_policy(FailurePolicy::SkipAndLog)
            .build()
            .unwrap();
        let path = RegularizationPath::new([0.1]).unwrap();
        assert!(run(&config, &path, &FailingSolver).is_err());
    }

    #[test]
    fn test_skip_policy_drops_failed_repetitions() {
        let config = ExperimentConfig::random(5, 50, 0.4)
            .repetitions(5)
            .seed(8)
            .failure_policy(FailurePolicy::SkipAndLog)
            .build()
            .unwrap();
        let path = RegularizationPath::new([0.1, 0.3]).unwrap();
        let solver = AlternatingSolver {
            calls: AtomicUsize::new(0),
        };
        let result = run(&config, &path, &solver).unwrap();

        assert_eq!(result.failed, 2);
        assert_eq!(result.records.len(), 3);
        // Calls follow repetition order only without rayon.
        #[cfg(not(feature = "parallel"))]
        {
            let reps: Vec<usize> = result.records.iter().map(|r| r.repetition).collect();
            assert_eq!(reps, vec![0, 2, 4]);
        }

        assert_eq!(result.summaries, aggregate(&result.records).unwrap());
        for (k, row) in result.summaries.iter().enumerate() {
            let mean = result
                .records
                .iter()
                .map(|r| r.points[k].tpr)
                .sum::<f64>()
                / 3.0;
            assert!((row.tpr.mean - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_trials_are_reproducible() {
        let config = ExperimentConfig::random(5, 200, 0.25)
            .seed(17)
            .build()
            .unwrap();
        let path = RegularizationPath::new([0.05, 0.2]).unwrap();
        let a = run_trial(&config, &path, &Glasso::default(), 4).unwrap();
        let b = run_trial(&config, &path, &Glasso::default(), 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }

    fn record(repetition: usize, rhos: &[f64]) -> TrialRecord {
        TrialRecord {
            repetition,
            points: rhos
                .iter()
                .map(|&rho| PathPoint {
                    rho,
                    score: EdgeScore {
                        true_positives: 1,
                        false_positives: 0,
                        positives: 1,
                        negatives: 1,
                    },
                    tpr: 1.0,
                    fpr: 0.0,
                    connectivity: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_aggregate_rejects_mixed_paths() {
        let shorter = [record(0, &[0.1, 0.2]), record(1, &[0.1])];
        assert!(matches!(
            aggregate(&shorter),
            Err(GlassoError::ShapeMismatch { .. })
        ));

        let shifted = [record(0, &[0.1, 0.2]), record(1, &[0.1, 0.3])];
        assert!(matches!(
            aggregate(&shifted),
            Err(GlassoError::InvalidArgument(_))
        ));

        let same = [record(0, &[0.1, 0.2]), record(1, &[0.1, 0.2])];
        let summaries = aggregate(&same).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].rho, 0.2);
        assert_eq!(summaries[1].tpr.mean, 1.0);
    }
}
