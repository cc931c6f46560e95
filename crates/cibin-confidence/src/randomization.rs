//! Randomization test for candidate potential-outcome tables
//!
//! Under a candidate table every subject's pair of potential outcomes is
//! fixed, so the only randomness is which `n` of the `N` subjects received
//! treatment. The test compares the observed distance `|t* − τ|` with the
//! `(1 − α)` percentile of `|τ̂ − τ|` across assignments.
//!
//! Cost per candidate table:
//!
//! - [`ExactEnumeration`]: O(n³) assignment groups, O(n³) memory, covering all
//!   `C(N, n)` assignments
//! - [`MonteCarlo`]: O(reps · N) time, O(reps) memory

use crate::traits::{NullDistribution, NullSample};
use cibin_core::{
    arm_difference, binomial, CandidateTable, Error, ObservedTable, Result, WeightedDistribution,
};
use rand::Rng;
use tracing::{instrument, trace};

/// Default cap on `C(N, n)` for exact enumeration
pub const DEFAULT_MAX_COMBINATIONS: u64 = 100_000;

/// Default number of sampled assignments in Monte Carlo mode
pub const DEFAULT_REPLICATIONS: usize = 1_000;

/// Exact null distribution over all `C(N, n)` treatment assignments
///
/// Subjects sharing a row of potential outcomes are interchangeable, so an
/// assignment is summarised by how many subjects of each of the four row
/// types it treats, `(k00, k01, k10, k11)`. Each such group contributes one
/// value of `τ̂` with multiplicity `∏ C(Nij, kij)`; the multiplicities add up
/// to `C(N, n)` and the resulting distribution is the one obtained by
/// listing every subset of subject indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactEnumeration {
    max_combinations: u64,
}

impl ExactEnumeration {
    pub fn new(max_combinations: u64) -> Self {
        Self { max_combinations }
    }

    pub fn max_combinations(&self) -> u64 {
        self.max_combinations
    }

    /// Number of assignments, or an error if it exceeds the cap
    pub fn assignments(&self, total: u64, treated: u64) -> Result<u64> {
        let limit = self.max_combinations;
        match binomial(total, treated) {
            Some(count) if count <= u128::from(limit) => Ok(count as u64),
            Some(count) => Err(Error::TooManyCombinations {
                required: count,
                limit,
            }),
            None => Err(Error::TooManyCombinations {
                required: u128::MAX,
                limit,
            }),
        }
    }
}

impl Default for ExactEnumeration {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMBINATIONS)
    }
}

impl NullDistribution for ExactEnumeration {
    fn null_distribution(&mut self, table: &CandidateTable, treated: u64) -> Result<NullSample> {
        let total = table.total();
        let control = total - treated;
        let replications = self.assignments(total, treated)?;
        let tau = table.tau();
        let [n00, n01, n10, n11] = table.as_array();

        let mut points = Vec::new();
        for k00 in 0..=n00.min(treated) {
            for k01 in 0..=n01.min(treated - k00) {
                for k10 in 0..=n10.min(treated - k00 - k01) {
                    let k11 = treated - k00 - k01 - k10;
                    if k11 > n11 {
                        continue;
                    }
                    let weight = [(n00, k00), (n01, k01), (n10, k10), (n11, k11)]
                        .into_iter()
                        .try_fold(1u128, |acc, (n, k)| acc.checked_mul(binomial(n, k)?))
                        .ok_or_else(|| {
                            Error::Computation(format!(
                                "assignment multiplicity overflow for table {table}"
                            ))
                        })?;
                    let treated_ones = k01 + k11;
                    let control_ones = (n10 - k10) + (n11 - k11);
                    let tau_hat = arm_difference(treated_ones, treated, control_ones, control);
                    points.push(((tau_hat - tau).abs(), weight));
                }
            }
        }

        Ok(NullSample {
            distribution: WeightedDistribution::from_weighted(points),
            replications,
        })
    }

    fn name(&self) -> &'static str {
        "exact enumeration"
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

/// Monte Carlo null distribution from sampled treatment assignments
///
/// Each replication draws `n` distinct subjects for treatment from the
/// expanded potential outcome matrix. `R` may be a borrowed generator
/// (`&mut R` implements [`Rng`]), which keeps the caller in control of
/// seeding.
#[derive(Debug)]
pub struct MonteCarlo<R> {
    rng: R,
    reps: usize,
}

impl<R: Rng> MonteCarlo<R> {
    pub fn new(rng: R, reps: usize) -> Self {
        Self { rng, reps }
    }

    pub fn reps(&self) -> usize {
        self.reps
    }

    pub fn into_rng(self) -> R {
        self.rng
    }
}

impl<R: Rng> NullDistribution for MonteCarlo<R> {
    fn null_distribution(&mut self, table: &CandidateTable, treated: u64) -> Result<NullSample> {
        if self.reps == 0 {
            return Err(Error::InvalidInput(
                "Monte Carlo mode needs at least one replication".to_string(),
            ));
        }
        let outcomes = table.potential_outcomes();
        let rows = outcomes.rows();
        let control = table.total() - treated;
        let (control_total, _) = outcomes.column_sums();
        let tau = table.tau();

        let mut distances = Vec::with_capacity(self.reps);
        for _ in 0..self.reps {
            let sample = rand::seq::index::sample(&mut self.rng, rows.len(), treated as usize);
            let (mut treated_ones, mut treated_control_ones) = (0u64, 0u64);
            for subject in sample.iter() {
                let [c, t] = rows[subject];
                treated_control_ones += u64::from(c);
                treated_ones += u64::from(t);
            }
            let control_ones = control_total - treated_control_ones;
            let tau_hat = arm_difference(treated_ones, treated, control_ones, control);
            distances.push((tau_hat - tau).abs());
        }

        Ok(NullSample {
            distribution: WeightedDistribution::from_values(distances),
            replications: self.reps as u64,
        })
    }

    fn name(&self) -> &'static str {
        "monte carlo"
    }
}

/// Decision of the randomization test for one candidate table
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub table: CandidateTable,
    /// Observed distance `|t* − τ|`
    pub statistic: f64,
    /// `(1 − α)` percentile of the null distances
    pub critical_value: f64,
    pub accepted: bool,
    pub replications: u64,
}

/// Randomization test of candidate tables against one observed experiment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomizationTest {
    observed: ObservedTable,
    alpha: f64,
    estimate: f64,
}

impl RandomizationTest {
    /// Create a test at significance level `alpha`
    ///
    /// Fails with [`Error::InvalidInput`] if alpha is outside (0, 1) or an arm
    /// of the experiment is empty.
    pub fn new(observed: &ObservedTable, alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::alpha_out_of_range(alpha));
        }
        observed.validate_arms()?;
        Ok(Self {
            observed: *observed,
            alpha,
            estimate: observed.difference_in_means(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Observed difference in means `t*`
    pub fn observed_estimate(&self) -> f64 {
        self.estimate
    }

    /// Percentile (in `[0, 100]`) used as the critical value
    pub fn percentile(&self) -> f64 {
        (1.0 - self.alpha) * 100.0
    }

    /// Test one candidate table
    #[instrument(level = "trace", skip(self, null), fields(method = null.name()))]
    pub fn evaluate<D>(&self, table: &CandidateTable, null: &mut D) -> Result<TestOutcome>
    where
        D: NullDistribution + ?Sized,
    {
        if table.total() != self.observed.total() {
            return Err(Error::count_mismatch(table.total(), self.observed.total()));
        }
        let statistic = (self.estimate - table.tau()).abs();
        let sample = null.null_distribution(table, self.observed.treated())?;
        let critical_value = sample
            .distribution
            .percentile(self.percentile())
            .ok_or_else(|| Error::Computation(format!("empty null distribution for {table}")))?;
        let accepted = statistic <= critical_value;

        trace!(
            %table,
            statistic,
            critical_value,
            accepted,
            "randomization test"
        );

        Ok(TestOutcome {
            table: *table,
            statistic,
            critical_value,
            accepted,
            replications: sample.replications,
        })
    }
}
