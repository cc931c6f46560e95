//! Error types for exact treatment-effect intervals
//!
//! Provides a unified error type for all cibin crates.

use thiserror::Error;

/// Core error type for interval computations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Out-of-domain argument: negative counts, alpha outside (0, 1),
    /// mismatched totals, malformed tables
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Exact enumeration would need more treatment assignments than allowed
    #[error(
        "Invalid input: exact enumeration needs {required} combinations, \
         raise max_combinations to at least {required} (current limit {limit})"
    )]
    TooManyCombinations { required: u128, limit: u64 },

    /// Precondition of a hypergeometric routine does not hold
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a negative subject count
    pub fn negative_count(context: &str) -> Self {
        Self::InvalidInput(format!("{context}: subject count cannot be negative"))
    }

    /// Create an error for a significance level outside (0, 1)
    pub fn alpha_out_of_range(alpha: f64) -> Self {
        Self::InvalidInput(format!("alpha {alpha} must be in (0, 1)"))
    }

    /// Create an error for a confidence level outside (0, 1)
    pub fn confidence_level_out_of_range(cl: f64) -> Self {
        Self::PreconditionFailed(format!("confidence level {cl} must be in (0, 1)"))
    }

    /// Create an error for totals that do not add up
    pub fn count_mismatch(total: u64, observed: u64) -> Self {
        Self::InvalidInput(format!(
            "number of subjects do not match: {total} subjects cannot hold {observed} observations"
        ))
    }

    /// Create an error for a subject count too large for signed arithmetic
    pub fn too_many_subjects() -> Self {
        Self::InvalidInput(format!("number of subjects cannot exceed {}", i64::MAX))
    }

    /// Whether the error belongs to the invalid-input family
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::TooManyCombinations { .. })
    }

    /// Whether the error is a failed precondition
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, Self::PreconditionFailed(_))
    }
}
