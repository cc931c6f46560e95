//! Common types for confidence intervals

use cibin_core::{CandidateTable, Error, Result};
use std::fmt;

/// Two-sided confidence interval for the average treatment effect
///
/// The bounds are the smallest and largest effects implied by candidate
/// tables that survived the randomization test, together with the tables
/// that attain them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AteInterval {
    /// Lower bound of the interval
    pub lower: f64,
    /// Upper bound of the interval
    pub upper: f64,
    /// Table attaining the lower bound
    pub lower_table: CandidateTable,
    /// Table attaining the upper bound
    pub upper_table: CandidateTable,
    /// Number of candidate tables tested
    pub tables_examined: u64,
    /// Randomization replications summed over all tested tables
    pub replications: u64,
    /// Confidence level (e.g., 0.95 for 95% CI)
    pub confidence_level: f64,
}

impl AteInterval {
    /// Number of subjects in the experiment
    pub fn n_subjects(&self) -> u64 {
        self.lower_table.total()
    }

    /// Bounds multiplied by `N`, as exact integers
    pub fn scaled_bounds(&self) -> (i64, i64) {
        (
            self.lower_table.tau_numerator(),
            self.upper_table.tau_numerator(),
        )
    }

    /// Width of the confidence interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if a value is contained in the interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for AteInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% CI: [{:.4}, {:.4}], tables {} / {}, {} tables, {} reps",
            self.confidence_level * 100.0,
            self.lower,
            self.upper,
            self.lower_table,
            self.upper_table,
            self.tables_examined,
            self.replications
        )
    }
}

/// Confidence level type with validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Create a new confidence level
    ///
    /// Fails with [`Error::PreconditionFailed`] unless level is in (0, 1).
    pub fn new(level: f64) -> Result<Self> {
        if level > 0.0 && level < 1.0 {
            Ok(Self(level))
        } else {
            Err(Error::confidence_level_out_of_range(level))
        }
    }

    /// Get the confidence level value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the alpha level (1 - confidence level)
    pub fn alpha(&self) -> f64 {
        1.0 - self.0
    }

    /// Get the tail probability (alpha/2 for two-tailed)
    pub fn tail_probability(&self) -> f64 {
        self.alpha() / 2.0
    }

    /// Common confidence levels
    pub const NINETY: Self = Self(0.90);
    pub const NINETY_FIVE: Self = Self(0.95);
    pub const NINETY_NINE: Self = Self(0.99);
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = Error;

    fn try_from(level: f64) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

/// Which side(s) of a hypergeometric parameter to bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alternative {
    /// Both bounds, each tail at half of alpha
    #[default]
    TwoSided,
    /// Lower bound only; the upper bound is the population size
    Lower,
    /// Upper bound only; the lower bound is zero
    Upper,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TwoSided => "two-sided",
            Self::Lower => "lower",
            Self::Upper => "upper",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval() -> AteInterval {
        AteInterval {
            lower: -14.0 / 16.0,
            upper: -5.0 / 16.0,
            lower_table: CandidateTable::new(0, 0, 14, 2),
            upper_table: CandidateTable::new(6, 0, 5, 5),
            tables_examined: 182,
            replications: 182 * 12_870,
            confidence_level: 0.95,
        }
    }

    #[test]
    fn test_ate_interval() {
        let ci = interval();
        assert_eq!(ci.n_subjects(), 16);
        assert_eq!(ci.scaled_bounds(), (-14, -5));
        assert_eq!(ci.width() * 16.0, 9.0);
        assert!(ci.contains(-0.5));
        assert!(!ci.contains(0.0));
    }

    #[test]
    fn test_ate_interval_display() {
        let display = format!("{}", interval());
        assert!(display.contains("95.0%"));
        assert!(display.contains("-0.8750"));
        assert!(display.contains("-0.3125"));
        assert!(display.contains("[0, 0, 14, 2]"));
    }

    #[test]
    fn test_confidence_level() {
        let level = ConfidenceLevel::new(0.95).unwrap();
        assert_eq!(level.value(), 0.95);
        assert!((level.alpha() - 0.05).abs() < 1e-10);
        assert!((level.tail_probability() - 0.025).abs() < 1e-10);
        assert_eq!(ConfidenceLevel::NINETY_NINE.value(), 0.99);
    }

    #[test]
    fn test_invalid_confidence_level() {
        assert!(ConfidenceLevel::new(1.5).unwrap_err().is_precondition_failure());
        assert!(ConfidenceLevel::try_from(0.0).is_err());
        assert!(ConfidenceLevel::new(f64::NAN).is_err());
    }

    #[test]
    fn test_confidence_level_display() {
        assert_eq!(format!("{}", ConfidenceLevel::NINETY_FIVE), "95.0%");
        assert_eq!(format!("{}", ConfidenceLevel::new(0.99).unwrap()), "99.0%");
    }

    #[test]
    fn test_alternative_display() {
        assert_eq!(Alternative::default(), Alternative::TwoSided);
        assert_eq!(Alternative::Upper.to_string(), "upper");
    }
}
