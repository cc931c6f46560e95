//! Observed and latent 2×2 tables
//!
//! An [`ObservedTable`] counts subjects by treatment assignment and observed
//! outcome. A [`CandidateTable`] counts subjects by their pair of potential
//! outcomes (control, treatment). Li & Ding (2016), Theorem 1, gives a closed
//! form test of whether a candidate table could have produced the observed
//! one; [`TableEnumerator`] walks every candidate table that passes it.

use crate::error::{Error, Result};
use crate::outcomes::PotentialOutcomeMatrix;
use std::fmt;
use std::iter::FusedIterator;

/// Counts of subjects by (treatment assignment, observed outcome)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedTable {
    /// Assigned to treatment, outcome 1
    pub n11: u64,
    /// Assigned to treatment, outcome 0
    pub n10: u64,
    /// Assigned to control, outcome 1
    pub n01: u64,
    /// Assigned to control, outcome 0
    pub n00: u64,
}

impl ObservedTable {
    /// Create an observed table from signed counts
    ///
    /// Fails with [`Error::InvalidInput`] if any count is negative or if the
    /// counts sum past `i64::MAX`.
    pub fn new(n11: i64, n10: i64, n01: i64, n00: i64) -> Result<Self> {
        let table = Self {
            n11: non_negative(n11, "n11")?,
            n10: non_negative(n10, "n10")?,
            n01: non_negative(n01, "n01")?,
            n00: non_negative(n00, "n00")?,
        };
        checked_total([table.n11, table.n10, table.n01, table.n00])?;
        Ok(table)
    }

    /// Create an observed table from counts that are already known to be valid
    pub const fn from_counts(n11: u64, n10: u64, n01: u64, n00: u64) -> Self {
        Self { n11, n10, n01, n00 }
    }

    /// Total number of subjects `N`
    pub fn total(&self) -> u64 {
        self.n11 + self.n10 + self.n01 + self.n00
    }

    /// Size of the treatment arm `n`
    pub fn treated(&self) -> u64 {
        self.n11 + self.n10
    }

    /// Size of the control arm `N - n`
    pub fn control(&self) -> u64 {
        self.n01 + self.n00
    }

    /// Check that both arms are non-empty
    pub fn validate_arms(&self) -> Result<()> {
        if self.treated() == 0 || self.control() == 0 {
            return Err(Error::InvalidInput(format!(
                "both arms need subjects: treatment has {}, control has {}",
                self.treated(),
                self.control()
            )));
        }
        Ok(())
    }

    /// Unbiased difference-in-means estimate `n11/n - n01/(N - n)`
    ///
    /// Both arms must be non-empty; see [`validate_arms`](Self::validate_arms).
    pub fn difference_in_means(&self) -> f64 {
        arm_difference(self.n11, self.treated(), self.n01, self.control())
    }
}

impl fmt::Display for ObservedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[n11={}, n10={}, n01={}, n00={}]",
            self.n11, self.n10, self.n01, self.n00
        )
    }
}

/// Difference in arm means, computed exactly the same way for the observed
/// estimate and for every re-randomized assignment.
#[inline]
pub fn arm_difference(treated_ones: u64, treated: u64, control_ones: u64, control: u64) -> f64 {
    treated_ones as f64 / treated as f64 - control_ones as f64 / control as f64
}

/// Counts of subjects by (potential outcome under control, under treatment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateTable {
    /// Outcome 0 under control and treatment
    pub n00: u64,
    /// Outcome 0 under control, 1 under treatment
    pub n01: u64,
    /// Outcome 1 under control, 0 under treatment
    pub n10: u64,
    /// Outcome 1 under control and treatment
    pub n11: u64,
}

impl CandidateTable {
    pub const fn new(n00: u64, n01: u64, n10: u64, n11: u64) -> Self {
        Self { n00, n01, n10, n11 }
    }

    /// Build a table from a slice `[N00, N01, N10, N11]`
    ///
    /// Fails with [`Error::InvalidInput`] if the slice does not have exactly
    /// four entries, if any entry is negative, or if the entries sum past
    /// `i64::MAX`.
    pub fn from_slice(counts: &[i64]) -> Result<Self> {
        let [n00, n01, n10, n11] = counts else {
            return Err(Error::InvalidInput(format!(
                "table size must be 4 (N00, N01, N10, N11), got {}",
                counts.len()
            )));
        };
        let table = Self {
            n00: non_negative(*n00, "N00")?,
            n01: non_negative(*n01, "N01")?,
            n10: non_negative(*n10, "N10")?,
            n11: non_negative(*n11, "N11")?,
        };
        checked_total(table.as_array())?;
        Ok(table)
    }

    /// Total number of subjects `N`
    pub fn total(&self) -> u64 {
        self.n00 + self.n01 + self.n10 + self.n11
    }

    /// Counts in the order `[N00, N01, N10, N11]`
    pub fn as_array(&self) -> [u64; 4] {
        [self.n00, self.n01, self.n10, self.n11]
    }

    /// Numerator of the implied average treatment effect, `N01 - N10`
    ///
    /// The denominator is always [`total`](Self::total), so within one
    /// experiment this integer is an exact key for the effect.
    pub fn tau_numerator(&self) -> i64 {
        self.n01 as i64 - self.n10 as i64
    }

    /// Implied average treatment effect `(N01 - N10) / N`
    pub fn tau(&self) -> f64 {
        self.tau_numerator() as f64 / self.total() as f64
    }

    /// Subjects whose control potential outcome is 1
    pub fn control_ones(&self) -> u64 {
        self.n10 + self.n11
    }

    /// Subjects whose treatment potential outcome is 1
    pub fn treatment_ones(&self) -> u64 {
        self.n01 + self.n11
    }

    /// Expand into one row of potential outcomes per subject
    pub fn potential_outcomes(&self) -> PotentialOutcomeMatrix {
        PotentialOutcomeMatrix::from_table(self)
    }

    /// Li & Ding (2016) Theorem 1 bound, without validating totals
    pub fn satisfies_bound(&self, observed: &ObservedTable) -> bool {
        let total = self.total() as i64;
        let (big01, big10, big11) = (self.n01 as i64, self.n10 as i64, self.n11 as i64);
        let (n11, n10, n01) = (observed.n11 as i64, observed.n10 as i64, observed.n01 as i64);

        let lower = 0_i64
            .max(n11 - big01)
            .max(big11 - n01)
            .max(big10 + big11 - n10 - n01);
        let upper = big11
            .min(n11)
            .min(big10 + big11 - n01)
            .min(total - big01 - n01 - n10);
        lower <= upper
    }
}

impl fmt::Display for CandidateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.n00, self.n01, self.n10, self.n11
        )
    }
}

impl From<[u64; 4]> for CandidateTable {
    fn from(counts: [u64; 4]) -> Self {
        Self::new(counts[0], counts[1], counts[2], counts[3])
    }
}

/// Check whether `table` is consistent with the observed counts
///
/// Fails if the candidate holds fewer subjects than were observed.
pub fn is_consistent(table: &CandidateTable, observed: &ObservedTable) -> Result<bool> {
    if table.total() < observed.total() {
        return Err(Error::count_mismatch(table.total(), observed.total()));
    }
    Ok(table.satisfies_bound(observed))
}

/// Check a raw table `[N00, N01, N10, N11]` against raw observed counts
///
/// Negative counts, a table with the wrong arity or a table holding fewer
/// subjects than were observed are rejected with [`Error::InvalidInput`].
pub fn filter_table(nt: &[i64], n00: i64, n01: i64, n10: i64, n11: i64) -> Result<bool> {
    let observed = ObservedTable::new(n11, n10, n01, n00)?;
    let table = CandidateTable::from_slice(nt)?;
    is_consistent(&table, &observed)
}

/// Lazy enumeration of candidate tables consistent with an observation
///
/// Walks `N00` over `[0, N)`, `N01` over `[0, N - N00)` and `N10` over
/// `[0, N - N00 - N01)`, with `N11` taking the remainder, and yields the
/// tables passing [`CandidateTable::satisfies_bound`]. The half-open ranges
/// leave `N11 >= 1` on every table visited.
///
/// Cloning an enumerator that has not been advanced gives an independent
/// fresh pass.
#[derive(Debug, Clone)]
pub struct TableEnumerator {
    total: u64,
    observed: ObservedTable,
    cursor: Option<[u64; 3]>,
}

impl TableEnumerator {
    /// Enumerate the tables of `total` subjects consistent with `observed`
    pub fn new(total: u64, observed: &ObservedTable) -> Result<Self> {
        if total > i64::MAX as u64 {
            return Err(Error::too_many_subjects());
        }
        if total < observed.total() {
            return Err(Error::count_mismatch(total, observed.total()));
        }
        Ok(Self {
            total,
            observed: *observed,
            cursor: (total > 0).then_some([0, 0, 0]),
        })
    }

    /// Enumerate the tables for an experiment whose size is the observed total
    pub fn for_observed(observed: &ObservedTable) -> Self {
        Self {
            total: observed.total(),
            observed: *observed,
            cursor: (observed.total() > 0).then_some([0, 0, 0]),
        }
    }

    /// Number of subjects in every table produced
    pub fn total(&self) -> u64 {
        self.total
    }

    fn advance(&mut self) {
        let Some([n00, n01, n10]) = self.cursor else {
            return;
        };
        let total = self.total;
        self.cursor = if n10 + 1 < total - n00 - n01 {
            Some([n00, n01, n10 + 1])
        } else if n01 + 1 < total - n00 {
            Some([n00, n01 + 1, 0])
        } else if n00 + 1 < total {
            Some([n00 + 1, 0, 0])
        } else {
            None
        };
    }
}

impl Iterator for TableEnumerator {
    type Item = CandidateTable;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some([n00, n01, n10]) = self.cursor {
            self.advance();
            let table = CandidateTable::new(n00, n01, n10, self.total - n00 - n01 - n10);
            if table.satisfies_bound(&self.observed) {
                return Some(table);
            }
        }
        None
    }
}

impl FusedIterator for TableEnumerator {}

/// Enumerate tables of `total` subjects consistent with raw observed counts
///
/// Fails with [`Error::InvalidInput`] if any count is negative or if `total`
/// is smaller than the number of observed subjects.
pub fn n_generator(total: i64, n00: i64, n01: i64, n10: i64, n11: i64) -> Result<TableEnumerator> {
    let observed = ObservedTable::new(n11, n10, n01, n00)?;
    let total = non_negative(total, "N")?;
    TableEnumerator::new(total, &observed)
}

fn non_negative(count: i64, name: &str) -> Result<u64> {
    u64::try_from(count).map_err(|_| Error::negative_count(name))
}

/// Sum of four counts, kept within the range where effects fit in `i64`
fn checked_total(counts: [u64; 4]) -> Result<u64> {
    counts
        .iter()
        .try_fold(0u64, |acc, &count| acc.checked_add(count))
        .filter(|&total| total <= i64::MAX as u64)
        .ok_or_else(Error::too_many_subjects)
}
