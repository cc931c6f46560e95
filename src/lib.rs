//! Exact confidence bounds for binary-outcome experiments
//!
//! Facade over the workspace crates:
//!
//! - [`cibin_core`]: observed and candidate tables, table enumeration, outcome
//!   expansion, exact combinatorics
//! - [`cibin_confidence`]: randomization-inference intervals for the average
//!   treatment effect and hypergeometric bounds
//!
//! # Example
//!
//! ```rust
//! use cibin::prelude::*;
//!
//! // Li & Ding (2016), Table 1
//! let ci = tau_twosided_ci(2, 6, 8, 0, 0.05, true, 100_000, 1_000, None)?;
//! assert_eq!(ci.scaled_bounds(), (-14, -5));
//! # Ok::<(), cibin::Error>(())
//! ```

pub use cibin_confidence;
pub use cibin_core;

pub use cibin_confidence::{
    hypergeom_accept, hypergeom_conf_interval, sterne_conf_interval, tau_twosided_ci,
    tau_twosided_ci_auto, tau_twosided_ci_exact, AcceptanceRegion, Alternative,
    AteConfidenceInterval, AteInterval, ConfidenceLevel, ConfidenceSet, ExactEnumeration,
    MonteCarlo, NullDistribution, RandomizationTest,
};
pub use cibin_core::{
    filter_table, is_consistent, n_generator, potential_outcomes, CandidateTable, Error,
    ObservedTable, PotentialOutcomeMatrix, Result, TableEnumerator,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use cibin_confidence::{
        hypergeom_accept, hypergeom_conf_interval, sterne_conf_interval, tau_twosided_ci,
        Alternative, AteConfidenceInterval, AteInterval,
    };
    pub use cibin_core::prelude::*;
    pub use cibin_core::{filter_table, n_generator};
}
