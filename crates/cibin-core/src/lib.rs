//! Core types for exact treatment-effect confidence intervals
//!
//! This crate holds the pieces shared by every interval method:
//!
//! - **Tables**: [`ObservedTable`] (assignment × observed outcome) and
//!   [`CandidateTable`] (control × treatment potential outcomes)
//! - **Enumeration**: [`TableEnumerator`] yields every candidate table that
//!   Li & Ding (2016) Theorem 1 allows for an observation
//! - **Expansion**: [`PotentialOutcomeMatrix`] lays a candidate table out as
//!   one row per subject
//! - **Math**: exact binomial coefficients and weighted empirical percentiles
//!
//! # Example
//!
//! ```rust
//! use cibin_core::{ObservedTable, TableEnumerator};
//!
//! let observed = ObservedTable::new(1, 1, 2, 0)?;
//! for table in TableEnumerator::for_observed(&observed) {
//!     let po = table.potential_outcomes();
//!     assert_eq!(po.n_subjects(), 4);
//!     println!("{table}: tau = {}", table.tau());
//! }
//! # Ok::<(), cibin_core::Error>(())
//! ```

pub mod error;
pub mod math;
pub mod outcomes;
pub mod tables;

// Re-export core types
pub use error::{Error, Result};

pub use math::{binomial, WeightedDistribution};
pub use outcomes::{potential_outcomes, PotentialOutcomeMatrix};
pub use tables::{
    arm_difference, filter_table, is_consistent, n_generator, CandidateTable, ObservedTable,
    TableEnumerator,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        is_consistent, potential_outcomes, CandidateTable, Error, ObservedTable,
        PotentialOutcomeMatrix, Result, TableEnumerator,
    };
}
