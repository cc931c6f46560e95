//! End-to-end interval scenarios from Li & Ding (2016) and small hand-checked tables

use cibin::prelude::*;
use cibin::{tau_twosided_ci_exact, Error};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Exact interval at alpha = 0.05, bounds scaled by N
fn exact_bounds(n11: i64, n10: i64, n01: i64, n00: i64) -> (i64, i64) {
    tau_twosided_ci_exact(n11, n10, n01, n00, 0.05)
        .unwrap()
        .scaled_bounds()
}

#[test]
fn test_li_ding_table_one() {
    init_tracing();
    let ci = tau_twosided_ci(2, 6, 8, 0, 0.05, true, 100_000, 1_000, None).unwrap();
    assert_eq!(ci.lower * 16.0, -14.0);
    assert_eq!(ci.upper * 16.0, -5.0);
    assert_eq!(ci.lower_table, CandidateTable::new(0, 0, 14, 2));
    assert_eq!(ci.upper_table, CandidateTable::new(6, 0, 5, 5));
    assert_eq!(ci.tables_examined, 182);
    assert_eq!(ci.replications, 182 * 12_870);
}

#[test]
fn test_rare_outcome_experiment() {
    let ci = tau_twosided_ci(1, 1, 1, 13, 0.05, true, 100_000, 1_000, None).unwrap();
    assert_eq!(ci.scaled_bounds(), (-1, 14));
    assert_eq!(ci.lower_table, CandidateTable::new(14, 0, 1, 1));
    assert_eq!(ci.upper_table, CandidateTable::new(1, 14, 0, 1));
    assert_eq!(ci.tables_examined, 71);
}

#[test]
fn test_empty_treated_failure_arm() {
    let ci = tau_twosided_ci(6, 0, 11, 3, 0.05, true, 100_000, 1_000, None).unwrap();
    assert_eq!(ci.lower * 20.0, -4.0);
    assert_eq!(ci.upper * 20.0, 8.0);
    assert_eq!(ci.lower_table, CandidateTable::new(3, 0, 4, 13));
    assert_eq!(ci.upper_table, CandidateTable::new(1, 8, 0, 11));
    assert_eq!(ci.tables_examined, 332);
}

#[test]
fn test_small_balanced_experiments() {
    assert_eq!(exact_bounds(3, 2, 1, 4), (-2, 7));
    assert_eq!(exact_bounds(2, 3, 3, 2), (-6, 3));
    assert_eq!(exact_bounds(1, 1, 2, 0), (-3, 1));
}

#[test]
fn test_exact_and_sampled_agree_on_tiny_experiment() {
    init_tracing();
    let exact = tau_twosided_ci(1, 1, 2, 0, 0.05, true, 100_000, 1_000, None).unwrap();
    let sampled = tau_twosided_ci(1, 1, 2, 0, 0.05, false, 100_000, 1_000, Some(2016)).unwrap();

    assert_eq!(exact.lower, sampled.lower);
    assert_eq!(exact.upper, sampled.upper);
    assert_eq!(exact.lower_table, CandidateTable::new(0, 0, 3, 1));
    assert_eq!(exact.upper_table, CandidateTable::new(1, 1, 0, 2));
    assert_eq!(exact.lower_table, sampled.lower_table);
    assert_eq!(exact.upper_table, sampled.upper_table);

    assert_eq!(exact.tables_examined, 10);
    assert_eq!(sampled.tables_examined, 10);
    assert_eq!(exact.replications, 10 * 6);
    assert_eq!(sampled.replications, 10 * 1_000);
}

#[test]
fn test_repeated_calls_are_identical() {
    let first = tau_twosided_ci_exact(3, 2, 1, 4, 0.05).unwrap();
    let second = tau_twosided_ci_exact(3, 2, 1, 4, 0.05).unwrap();
    assert_eq!(first, second);

    let sampled = AteConfidenceInterval::new(0.05)
        .with_exact(false)
        .with_replications(300)
        .with_seed(11);
    let observed = ObservedTable::new(3, 2, 1, 4).unwrap();
    assert_eq!(
        sampled.confidence_interval(&observed).unwrap(),
        sampled.confidence_interval(&observed).unwrap()
    );
}

#[test]
fn test_seed_matches_injected_rng() {
    let observed = ObservedTable::new(2, 3, 3, 2).unwrap();
    let ci = AteConfidenceInterval::new(0.1)
        .with_exact(false)
        .with_replications(250);

    let seeded = ci.with_seed(99).confidence_interval(&observed).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let injected = ci.confidence_interval_with_rng(&observed, &mut rng).unwrap();
    assert_eq!(seeded, injected);
}

#[test]
fn test_smaller_alpha_gives_wider_interval() {
    let alphas = [0.01, 0.05, 0.1, 0.2, 0.5];
    let expected = [
        ((2, 6, 8, 0), [(-14, -2), (-14, -5), (-14, -6), (-14, -8), (-13, -10)]),
        ((3, 2, 1, 4), [(-3, 7), (-2, 7), (-1, 7), (-1, 7), (0, 6)]),
        ((2, 3, 3, 2), [(-6, 4), (-6, 3), (-6, 3), (-5, 2), (-4, 1)]),
    ];

    for ((n11, n10, n01, n00), bounds) in expected {
        let mut previous: Option<(i64, i64)> = None;
        for (alpha, want) in alphas.iter().zip(bounds) {
            let got = tau_twosided_ci_exact(n11, n10, n01, n00, *alpha)
                .unwrap()
                .scaled_bounds();
            assert_eq!(got, want, "({n11}, {n10}, {n01}, {n00}) at alpha = {alpha}");
            if let Some((low, upp)) = previous {
                assert!(low <= got.0 && got.1 <= upp);
            }
            previous = Some(got);
        }
    }
}

#[test]
fn test_invalid_inputs() {
    let err = tau_twosided_ci(5, 10, 10, 5, 1.1, true, 100_000, 1_000, None).unwrap_err();
    assert!(err.is_invalid_input());

    let err = tau_twosided_ci(-5, 10, 10, 5, 0.05, true, 100_000, 1_000, None).unwrap_err();
    assert!(err.is_invalid_input());

    let err = tau_twosided_ci(2, 6, 8, 0, 0.05, true, 1_000, 1_000, None).unwrap_err();
    assert_eq!(
        err,
        Error::TooManyCombinations {
            required: 12_870,
            limit: 1_000
        }
    );
}

#[test]
fn test_all_zero_outcomes_leave_empty_set() {
    // The only compatible table has no (1, 1) subjects, which enumeration skips
    let err = tau_twosided_ci_exact(0, 3, 0, 2, 0.05).unwrap_err();
    assert!(matches!(err, Error::Computation(_)));
}

#[test]
fn test_table_helpers() {
    assert!(!filter_table(&[5, 10, 10, 5], 6, 11, 10, 3).unwrap());
    assert_eq!(n_generator(16, 0, 8, 6, 2).unwrap().count(), 182);

    let po = potential_outcomes(&[1, 0, 1, 0]).unwrap();
    assert_eq!(po.rows(), &[[0, 0], [1, 0]]);
    assert!(potential_outcomes(&[1, 0, 1, 0, 2]).unwrap_err().is_invalid_input());
    assert!(potential_outcomes(&[1, -1, 1, 0]).unwrap_err().is_invalid_input());
}
