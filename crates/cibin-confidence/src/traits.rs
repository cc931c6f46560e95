//! Core traits for randomization inference
//!
//! A null distribution describes how the difference-in-means estimator
//! moves around the effect of a candidate table when only the treatment
//! assignment is random. Exact enumeration and Monte Carlo sampling are two
//! ways of producing it; the randomization test only needs the resulting
//! empirical distribution and how many assignments it covers.

use cibin_core::{CandidateTable, Result, WeightedDistribution};

/// Distribution of `|τ̂ − τ|` over re-randomized assignments
#[derive(Debug, Clone, PartialEq)]
pub struct NullSample {
    /// Distances from the table's effect, weighted by multiplicity
    pub distribution: WeightedDistribution,
    /// Number of treatment assignments the distribution represents
    pub replications: u64,
}

/// Source of the randomization null distribution for a candidate table
///
/// Implementations hold whatever state they need (an RNG, an enumeration
/// budget) and are called once per candidate table.
pub trait NullDistribution {
    /// Distribution of `|τ̂ − τ|` when `treated` of the table's subjects are
    /// assigned to treatment
    ///
    /// # Arguments
    /// * `table` - Candidate potential-outcome table
    /// * `treated` - Size of the treatment arm, `0 < treated < table.total()`
    fn null_distribution(&mut self, table: &CandidateTable, treated: u64) -> Result<NullSample>;

    /// Method name for logging
    fn name(&self) -> &'static str;

    /// Whether repeated calls on the same table always give the same answer
    fn is_deterministic(&self) -> bool {
        false
    }
}
