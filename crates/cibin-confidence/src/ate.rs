//! Two-sided confidence interval for the average treatment effect
//!
//! Method 3 of Li & Ding (2016): enumerate every potential-outcome table
//! compatible with the observed 2×2 table, keep those whose implied effect
//! survives a level-α randomization test, and report the range of surviving
//! effects.

use crate::randomization::{
    ExactEnumeration, MonteCarlo, RandomizationTest, TestOutcome, DEFAULT_MAX_COMBINATIONS,
    DEFAULT_REPLICATIONS,
};
use crate::traits::NullDistribution;
use crate::types::AteInterval;
use cibin_core::{CandidateTable, Error, ObservedTable, Result, TableEnumerator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Candidate tables that passed the test, keyed by their exact effect
///
/// The key is `N01 − N10`; the denominator `N` is shared by every table of
/// one experiment. A table with the same effect as an earlier one replaces
/// it, so the last table in enumeration order represents each effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceSet {
    tables: BTreeMap<i64, CandidateTable>,
}

impl ConfidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: CandidateTable) {
        self.tables.insert(table.tau_numerator(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables attaining the smallest and largest effect
    pub fn extremes(&self) -> Option<(CandidateTable, CandidateTable)> {
        let (_, lower) = self.tables.first_key_value()?;
        let (_, upper) = self.tables.last_key_value()?;
        Some((*lower, *upper))
    }

    /// Surviving tables in increasing order of effect
    pub fn iter(&self) -> impl Iterator<Item = &CandidateTable> {
        self.tables.values()
    }
}

/// Randomization-inference confidence interval for the ATE
///
/// # Example
///
/// ```rust
/// use cibin_confidence::AteConfidenceInterval;
/// use cibin_core::ObservedTable;
///
/// let observed = ObservedTable::new(1, 1, 1, 13)?;
/// let ci = AteConfidenceInterval::new(0.05).confidence_interval(&observed)?;
/// assert_eq!(ci.scaled_bounds(), (-1, 14));
/// # Ok::<(), cibin_core::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AteConfidenceInterval {
    alpha: f64,
    exact: bool,
    max_combinations: u64,
    reps: usize,
    seed: Option<u64>,
}

impl AteConfidenceInterval {
    /// Create an exact interval at significance level `alpha`
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            exact: true,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            reps: DEFAULT_REPLICATIONS,
            seed: None,
        }
    }

    /// Set the significance level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enumerate every assignment (`true`) or sample them (`false`)
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Set the largest `C(N, n)` exact mode may enumerate
    pub fn with_max_combinations(mut self, max_combinations: u64) -> Self {
        self.max_combinations = max_combinations;
        self
    }

    /// Set the number of sampled assignments per table in Monte Carlo mode
    pub fn with_replications(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn max_combinations(&self) -> u64 {
        self.max_combinations
    }

    pub fn replications(&self) -> usize {
        self.reps
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Compute the interval, seeding Monte Carlo sampling from the
    /// configured seed or from fresh entropy
    pub fn confidence_interval(&self, observed: &ObservedTable) -> Result<AteInterval> {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.confidence_interval_with_rng(observed, &mut rng)
    }

    /// Compute the interval, drawing Monte Carlo assignments from `rng`
    ///
    /// Exact mode never touches `rng`.
    #[instrument(skip(self, rng), fields(alpha = self.alpha, exact = self.exact))]
    pub fn confidence_interval_with_rng<R>(
        &self,
        observed: &ObservedTable,
        rng: &mut R,
    ) -> Result<AteInterval>
    where
        R: Rng + ?Sized,
    {
        let test = RandomizationTest::new(observed, self.alpha)?;
        let total = observed.total();
        let treated = observed.treated();

        let totals = if self.exact {
            let exact = ExactEnumeration::new(self.max_combinations);
            let assignments = exact.assignments(total, treated)?;
            debug!(total, treated, assignments, "exact randomization distribution");
            scan_exact(&test, observed, exact)?
        } else {
            if self.reps == 0 {
                return Err(Error::InvalidInput(
                    "Monte Carlo mode needs at least one replication".to_string(),
                ));
            }
            debug!(total, treated, reps = self.reps, "sampled randomization distribution");
            let mut null = MonteCarlo::new(rng, self.reps);
            scan(&test, observed, &mut null)?
        };

        debug!(
            method = totals.method,
            deterministic = totals.deterministic,
            tables_examined = totals.tables_examined,
            replications = totals.replications,
            accepted = totals.set.len(),
            "randomization scan completed"
        );

        let ScanTotals {
            set: confidence_set,
            tables_examined,
            replications,
            ..
        } = totals;
        let (lower_table, upper_table) = confidence_set.extremes().ok_or_else(|| {
            Error::Computation(format!(
                "no candidate table consistent with {observed} passed the test"
            ))
        })?;

        Ok(AteInterval {
            lower: lower_table.tau(),
            upper: upper_table.tau(),
            lower_table,
            upper_table,
            tables_examined,
            replications,
            confidence_level: 1.0 - self.alpha,
        })
    }
}

impl Default for AteConfidenceInterval {
    fn default() -> Self {
        Self::new(0.05)
    }
}

/// Running tally of a scan over candidate tables
#[derive(Debug)]
struct ScanTotals {
    set: ConfidenceSet,
    tables_examined: u64,
    replications: u64,
    method: &'static str,
    deterministic: bool,
}

impl ScanTotals {
    fn new<D>(null: &D) -> Self
    where
        D: NullDistribution + ?Sized,
    {
        Self {
            set: ConfidenceSet::new(),
            tables_examined: 0,
            replications: 0,
            method: null.name(),
            deterministic: null.is_deterministic(),
        }
    }

    /// Fold one test result in; outcomes must arrive in enumeration order
    fn record(&mut self, outcome: TestOutcome) {
        self.tables_examined += 1;
        self.replications = self.replications.saturating_add(outcome.replications);
        if outcome.accepted {
            self.set.insert(outcome.table);
        }
    }
}

/// Test every candidate table in enumeration order
fn scan<D>(test: &RandomizationTest, observed: &ObservedTable, null: &mut D) -> Result<ScanTotals>
where
    D: NullDistribution + ?Sized,
{
    let mut totals = ScanTotals::new(&*null);
    TableEnumerator::for_observed(observed).try_for_each(|table| {
        totals.record(test.evaluate(&table, null)?);
        Ok::<_, Error>(())
    })?;
    Ok(totals)
}

#[cfg(not(feature = "parallel"))]
fn scan_exact(
    test: &RandomizationTest,
    observed: &ObservedTable,
    mut exact: ExactEnumeration,
) -> Result<ScanTotals> {
    scan(test, observed, &mut exact)
}

/// Exact tests are independent per table; rayon preserves input order on
/// `collect`, so the confidence set is built exactly as in a sequential scan.
#[cfg(feature = "parallel")]
fn scan_exact(
    test: &RandomizationTest,
    observed: &ObservedTable,
    exact: ExactEnumeration,
) -> Result<ScanTotals> {
    use rayon::prelude::*;

    let tables: Vec<_> = TableEnumerator::for_observed(observed).collect();
    let outcomes = tables
        .par_iter()
        .map(|table| {
            let mut exact = exact;
            test.evaluate(table, &mut exact)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut totals = ScanTotals::new(&exact);
    for outcome in outcomes {
        totals.record(outcome);
    }
    Ok(totals)
}
