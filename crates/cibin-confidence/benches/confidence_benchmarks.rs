use cibin_confidence::{
    hypergeom_conf_interval, sterne_conf_interval, Alternative, AteConfidenceInterval,
    ExactEnumeration, MonteCarlo, NullDistribution,
};
use cibin_core::{CandidateTable, ObservedTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Observed tables of increasing size, all with `N / 2` treated
fn observed_tables() -> Vec<(&'static str, ObservedTable)> {
    vec![
        ("N=4", ObservedTable::from_counts(1, 1, 2, 0)),
        ("N=10", ObservedTable::from_counts(3, 2, 1, 4)),
        ("N=16", ObservedTable::from_counts(2, 6, 8, 0)),
    ]
}

fn bench_null_distribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("NullDistribution");
    let table = CandidateTable::new(3, 5, 4, 8);

    for treated in [4u64, 10, 16] {
        let mut exact = ExactEnumeration::new(u64::MAX);
        group.bench_with_input(BenchmarkId::new("exact", treated), &treated, |b, &treated| {
            b.iter(|| exact.null_distribution(black_box(&table), treated))
        });

        let mut sampled = MonteCarlo::new(ChaCha8Rng::seed_from_u64(42), 1_000);
        group.bench_with_input(
            BenchmarkId::new("monte_carlo", treated),
            &treated,
            |b, &treated| b.iter(|| sampled.null_distribution(black_box(&table), treated)),
        );
    }

    group.finish();
}

fn bench_ate_interval(c: &mut Criterion) {
    let mut group = c.benchmark_group("AteInterval");
    group.sample_size(10);

    for (name, observed) in observed_tables() {
        let exact = AteConfidenceInterval::new(0.05);
        group.bench_with_input(BenchmarkId::new("exact", name), &observed, |b, observed| {
            b.iter(|| exact.confidence_interval(black_box(observed)))
        });

        let sampled = AteConfidenceInterval::new(0.05)
            .with_exact(false)
            .with_replications(200)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new("monte_carlo", name),
            &observed,
            |b, observed| b.iter(|| sampled.confidence_interval(black_box(observed))),
        );
    }

    group.finish();
}

fn bench_hypergeometric(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hypergeometric");
    let populations = [100u64, 1_000, 10_000];

    for &population in &populations {
        let draws = population / 10;
        let x = draws / 3;
        group.bench_with_input(
            BenchmarkId::new("tail_inversion", population),
            &population,
            |b, &population| {
                b.iter(|| {
                    hypergeom_conf_interval(
                        black_box(draws),
                        black_box(x),
                        population,
                        0.95,
                        Alternative::TwoSided,
                        None,
                    )
                })
            },
        );
    }

    // Exhaustive over G, so only the small population
    group.bench_function("sterne/100", |b| {
        b.iter(|| sterne_conf_interval(black_box(10), black_box(3), 100, 0.95, false))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_null_distribution,
    bench_ate_interval,
    bench_hypergeometric
);
criterion_main!(benches);
