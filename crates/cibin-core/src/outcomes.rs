//! Per-subject potential outcome tables

use crate::error::Result;
use crate::tables::CandidateTable;

/// One `[control, treatment]` row of potential outcomes per subject
///
/// Rows come grouped as `(0,0)`, `(0,1)`, `(1,0)`, `(1,1)`. Subjects are
/// exchangeable, so only the multiset of rows carries meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PotentialOutcomeMatrix {
    rows: Vec<[u8; 2]>,
}

impl PotentialOutcomeMatrix {
    pub fn from_table(table: &CandidateTable) -> Self {
        let mut rows = Vec::with_capacity(table.total() as usize);
        for (row, count) in [
            ([0, 0], table.n00),
            ([0, 1], table.n01),
            ([1, 0], table.n10),
            ([1, 1], table.n11),
        ] {
            rows.extend(std::iter::repeat(row).take(count as usize));
        }
        Self { rows }
    }

    /// Number of subjects `N`
    pub fn n_subjects(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[[u8; 2]] {
        &self.rows
    }

    pub fn row(&self, subject: usize) -> Option<[u8; 2]> {
        self.rows.get(subject).copied()
    }

    /// Potential outcomes under control, one per subject
    pub fn control(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().map(|r| r[0])
    }

    /// Potential outcomes under treatment, one per subject
    pub fn treatment(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().map(|r| r[1])
    }

    /// Column totals `(control, treatment)`, i.e. `(N10 + N11, N01 + N11)`
    pub fn column_sums(&self) -> (u64, u64) {
        self.rows.iter().fold((0, 0), |(c, t), r| {
            (c + u64::from(r[0]), t + u64::from(r[1]))
        })
    }

    /// Collapse back into the four counts
    pub fn to_table(&self) -> CandidateTable {
        let mut counts = [0u64; 4];
        for r in &self.rows {
            counts[usize::from(r[0]) * 2 + usize::from(r[1])] += 1;
        }
        CandidateTable::from(counts)
    }

    pub fn into_rows(self) -> Vec<[u8; 2]> {
        self.rows
    }
}

/// Expand `[N00, N01, N10, N11]` into an `N × 2` potential outcome matrix
///
/// Fails with [`crate::Error::InvalidInput`] unless the slice has exactly
/// four non-negative entries.
pub fn potential_outcomes(nt: &[i64]) -> Result<PotentialOutcomeMatrix> {
    CandidateTable::from_slice(nt).map(|table| table.potential_outcomes())
}
