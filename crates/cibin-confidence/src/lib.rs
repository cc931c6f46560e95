//! Exact confidence intervals for binary-outcome experiments
//!
//! This crate provides two families of intervals:
//!
//! - **Treatment effects**: Li & Ding (2016) randomization inference for the
//!   average treatment effect, inverting a permutation test over every
//!   potential-outcome table compatible with the observed 2×2 table
//! - **Hypergeometric counts**: bounds on the number of "good" items in a
//!   finite population from a sample drawn without replacement
//!
//! # Overview
//!
//! The randomization null distribution is pluggable through
//! [`NullDistribution`]: [`ExactEnumeration`] covers all `C(N, n)` treatment
//! assignments, [`MonteCarlo`] samples them from any [`rand::Rng`].
//!
//! # Examples
//!
//! ## Average treatment effect
//!
//! ```rust
//! use cibin_confidence::AteConfidenceInterval;
//! use cibin_core::ObservedTable;
//!
//! let observed = ObservedTable::new(2, 6, 8, 0)?;
//! let ci = AteConfidenceInterval::new(0.05).confidence_interval(&observed)?;
//! println!("{ci}");
//! assert_eq!(ci.scaled_bounds(), (-14, -5));
//! # Ok::<(), cibin_core::Error>(())
//! ```
//!
//! ## Monte Carlo with a fixed seed
//!
//! ```rust
//! use cibin_confidence::api::tau_twosided_ci;
//!
//! let ci = tau_twosided_ci(1, 1, 2, 0, 0.05, false, 0, 500, Some(42))?;
//! assert!(ci.lower <= ci.upper);
//! # Ok::<(), cibin_core::Error>(())
//! ```
//!
//! ## Hypergeometric bounds
//!
//! ```rust
//! use cibin_confidence::{hypergeom_conf_interval, Alternative};
//!
//! let (low, upp) = hypergeom_conf_interval(10, 3, 50, 0.95, Alternative::TwoSided, None)?;
//! assert!(low <= 15 && 15 <= upp);
//! # Ok::<(), cibin_core::Error>(())
//! ```

pub mod api;
mod ate;
mod hypergeom;
mod randomization;
mod traits;
mod types;

// Re-exports
pub use api::{tau_twosided_ci, tau_twosided_ci_auto, tau_twosided_ci_exact};
pub use ate::{AteConfidenceInterval, ConfidenceSet};
pub use hypergeom::{
    hypergeom_accept, hypergeom_conf_interval, sterne_conf_interval, AcceptanceRegion,
};
pub use randomization::{
    ExactEnumeration, MonteCarlo, RandomizationTest, TestOutcome, DEFAULT_MAX_COMBINATIONS,
    DEFAULT_REPLICATIONS,
};
pub use traits::{NullDistribution, NullSample};
pub use types::{Alternative, AteInterval, ConfidenceLevel};
