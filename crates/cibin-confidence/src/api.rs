//! High-level API for treatment-effect confidence intervals
//!
//! Flat functions over [`AteConfidenceInterval`] for callers that hold the
//! four observed counts as plain integers.

use crate::ate::AteConfidenceInterval;
use crate::randomization::{ExactEnumeration, DEFAULT_MAX_COMBINATIONS, DEFAULT_REPLICATIONS};
use crate::types::AteInterval;
use cibin_core::{Error, ObservedTable, Result};
use tracing::debug;

pub use cibin_core::{filter_table, n_generator, potential_outcomes};

/// Two-sided confidence interval for the average treatment effect
///
/// Counts are by (assignment, observed outcome): `n11` treated with outcome
/// 1, `n10` treated with outcome 0, `n01` control with outcome 1, `n00`
/// control with outcome 0.
///
/// # Arguments
/// * `alpha` - Significance level in (0, 1)
/// * `exact` - Enumerate all `C(N, n)` assignments instead of sampling
/// * `max_combinations` - Largest `C(N, n)` exact mode accepts
/// * `reps` - Sampled assignments per candidate table (Monte Carlo only)
/// * `seed` - Seed for Monte Carlo sampling; fresh entropy when `None`
///
/// # Example
/// ```rust
/// use cibin_confidence::api::tau_twosided_ci;
///
/// let ci = tau_twosided_ci(2, 6, 8, 0, 0.05, true, 100_000, 1_000, None)?;
/// assert_eq!(ci.scaled_bounds(), (-14, -5));
/// assert_eq!(ci.tables_examined, 182);
/// # Ok::<(), cibin_core::Error>(())
/// ```
#[allow(clippy::too_many_arguments)]
pub fn tau_twosided_ci(
    n11: i64,
    n10: i64,
    n01: i64,
    n00: i64,
    alpha: f64,
    exact: bool,
    max_combinations: u64,
    reps: usize,
    seed: Option<u64>,
) -> Result<AteInterval> {
    let observed = ObservedTable::new(n11, n10, n01, n00)?;
    let mut ci = AteConfidenceInterval::new(alpha)
        .with_exact(exact)
        .with_max_combinations(max_combinations)
        .with_replications(reps);
    if let Some(seed) = seed {
        ci = ci.with_seed(seed);
    }
    ci.confidence_interval(&observed)
}

/// Exact interval with the default enumeration cap
pub fn tau_twosided_ci_exact(
    n11: i64,
    n10: i64,
    n01: i64,
    n00: i64,
    alpha: f64,
) -> Result<AteInterval> {
    tau_twosided_ci(
        n11,
        n10,
        n01,
        n00,
        alpha,
        true,
        DEFAULT_MAX_COMBINATIONS,
        DEFAULT_REPLICATIONS,
        None,
    )
}

/// Interval with automatic mode selection
///
/// Enumerates exactly when `C(N, n)` fits under [`DEFAULT_MAX_COMBINATIONS`]
/// and falls back to Monte Carlo sampling with [`DEFAULT_REPLICATIONS`]
/// otherwise.
pub fn tau_twosided_ci_auto(
    n11: i64,
    n10: i64,
    n01: i64,
    n00: i64,
    alpha: f64,
    seed: Option<u64>,
) -> Result<AteInterval> {
    let observed = ObservedTable::new(n11, n10, n01, n00)?;
    let cap = ExactEnumeration::default();
    let exact = match cap.assignments(observed.total(), observed.treated()) {
        Ok(_) => true,
        Err(Error::TooManyCombinations { required, limit }) => {
            debug!(required, limit, "falling back to Monte Carlo sampling");
            false
        }
        Err(e) => return Err(e),
    };
    tau_twosided_ci(
        n11,
        n10,
        n01,
        n00,
        alpha,
        exact,
        DEFAULT_MAX_COMBINATIONS,
        DEFAULT_REPLICATIONS,
        seed,
    )
}
