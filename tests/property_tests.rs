//! Property tests for generator and scorer invariants.

use glasso_roc::prelude::*;
use nalgebra::DMatrix;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

proptest! {
    #[test]
    fn random_precision_is_symmetric_positive_definite(
        p in 1usize..16,
        sparsity in 0.01f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let model = random_precision(p, sparsity, &mut rng).unwrap();

        prop_assert_eq!(model.theta.shape(), (p, p));
        let transposed = model.theta.transpose();
        prop_assert_eq!(&model.theta, &transposed);
        let min_eig = model.theta.clone().symmetric_eigenvalues().min();
        prop_assert!(min_eig > 0.0, "min eigenvalue {}", min_eig);
        prop_assert!(model.theta.clone().cholesky().is_some());
    }

    #[test]
    fn chain_has_two_couplings_per_link(p in 1usize..40) {
        let theta = markov_chain(p).unwrap().theta;
        let mut off_diagonal = 0;
        for i in 0..p {
            for j in 0..p {
                if i != j && theta[(i, j)] != 0.0 {
                    off_diagonal += 1;
                    prop_assert_eq!(i.abs_diff(j), 1);
                    prop_assert_eq!(theta[(i, j)], 0.5);
                }
            }
        }
        prop_assert_eq!(off_diagonal, 2 * (p - 1));
    }

    #[test]
    fn self_score_is_perfect(
        p in 2usize..12,
        sparsity in 0.05f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let theta = random_precision(p, sparsity, &mut rng).unwrap().theta;
        let s = score(&theta, &theta, 1e-8).unwrap();

        prop_assert_eq!(s.false_positive_rate(), 0.0);
        prop_assert_eq!(s.true_positives, s.positives);
        if s.positives > 0 {
            prop_assert_eq!(s.true_positive_rate(), 1.0);
        }
    }

    #[test]
    fn dense_estimate_never_scores_a_true_positive(
        p in 2usize..12,
        sparsity in 0.05f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let theta = random_precision(p, sparsity, &mut rng).unwrap().theta;
        let s = score(&theta, &DMatrix::from_element(p, p, 1.0), 1e-8).unwrap();
        prop_assert_eq!(s.true_positive_rate(), 0.0);
    }

    #[test]
    fn rates_stay_in_unit_interval(
        p in 2usize..10,
        seed in any::<u64>(),
        threshold in 0.0f64..0.5,
    ) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let theta = random_precision(p, 0.3, &mut rng).unwrap().theta;
        let estimate = random_precision(p, 0.3, &mut rng).unwrap().theta;
        let s = score(&theta, &estimate, threshold).unwrap();
        prop_assert!((0.0..=1.0).contains(&s.true_positive_rate()));
        prop_assert!((0.0..=1.0).contains(&s.false_positive_rate()));
    }
}
