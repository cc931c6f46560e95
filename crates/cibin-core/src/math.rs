//! Mathematical utilities for exact randomization inference
//!
//! Exact binomial coefficients for counting treatment assignments, and an
//! empirical distribution with integer multiplicities whose percentiles
//! interpolate linearly between order statistics.

/// Exact binomial coefficient `C(n, k)`
///
/// Returns `None` if the value (or an intermediate product) does not fit in
/// a `u128`.
///
/// # Examples
///
/// ```rust
/// use cibin_core::math::binomial;
///
/// assert_eq!(binomial(16, 8), Some(12_870));
/// assert_eq!(binomial(4, 5), Some(0));
/// ```
pub fn binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // result * (n - i) is always divisible by (i + 1)
        result = result.checked_mul(u128::from(n - i))? / u128::from(i + 1);
    }
    Some(result)
}

/// Empirical distribution over `f64` values with integer multiplicities
///
/// Equivalent to the sorted list in which each value is repeated as many
/// times as its weight, without materialising the repetitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedDistribution {
    points: Vec<(f64, u128)>,
    total: u128,
}

impl WeightedDistribution {
    /// Build from `(value, multiplicity)` pairs in any order
    pub fn from_weighted(points: impl IntoIterator<Item = (f64, u128)>) -> Self {
        let mut points: Vec<_> = points.into_iter().filter(|&(_, w)| w > 0).collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let total = points.iter().map(|&(_, w)| w).sum();
        Self { points, total }
    }

    /// Build from unweighted values
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self::from_weighted(values.into_iter().map(|v| (v, 1)))
    }

    /// Sum of all multiplicities
    pub fn total_weight(&self) -> u128 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Value at `rank` in the expanded sorted list (0-based, clamped)
    pub fn value_at_rank(&self, rank: u128) -> Option<f64> {
        let mut seen = 0u128;
        for &(value, weight) in &self.points {
            seen += weight;
            if rank < seen {
                return Some(value);
            }
        }
        self.points.last().map(|&(value, _)| value)
    }

    /// Percentile `q` in `[0, 100]` with linear interpolation
    ///
    /// The virtual index is `M·p + (1 − p) − 1` with `p = q / 100`, and the
    /// interpolation `a + (b − a)·g` switches to `b − (b − a)·(1 − g)` for
    /// `g ≥ 0.5`. Both forms follow numpy's `percentile`, so a statistic equal
    /// to an order statistic compares the same way it would there.
    ///
    /// Returns `None` for an empty distribution.
    pub fn percentile(&self, q: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let p = q / 100.0;
        let m = self.total as f64;
        let last = self.total - 1;

        let virtual_index = m * p + (1.0 - p) - 1.0;
        let floor = virtual_index.floor();
        let gamma = virtual_index - floor;
        let previous = if floor <= 0.0 {
            0
        } else {
            (floor as u128).min(last)
        };
        let next = (previous + 1).min(last);

        let a = self.value_at_rank(previous)?;
        let b = self.value_at_rank(next)?;
        let diff = b - a;
        Some(if gamma >= 0.5 {
            b - diff * (1.0 - gamma)
        } else {
            a + diff * gamma
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binomial_values() {
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 5), Some(1));
        assert_eq!(binomial(16, 2), Some(120));
        assert_eq!(binomial(20, 6), Some(38_760));
        assert_eq!(binomial(30, 15), Some(155_117_520));
        assert_eq!(binomial(3, 4), Some(0));
    }

    #[test]
    fn test_binomial_overflow() {
        assert!(binomial(200, 100).is_none());
        assert!(binomial(120, 60).is_some());
    }

    #[test]
    fn test_binomial_symmetry() {
        for n in 0..40 {
            for k in 0..=n {
                assert_eq!(binomial(n, k), binomial(n, n - k));
            }
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let dist = WeightedDistribution::from_values([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(dist.percentile(50.0).unwrap(), 3.0);
        assert_relative_eq!(dist.percentile(0.0).unwrap(), 1.0);
        assert_relative_eq!(dist.percentile(100.0).unwrap(), 5.0);
        assert_relative_eq!(dist.percentile(95.0).unwrap(), 4.8, epsilon = 1e-12);
        assert_relative_eq!(dist.percentile(10.0).unwrap(), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_match_repetition() {
        let weighted = WeightedDistribution::from_weighted([(0.5, 3), (0.25, 2), (1.0, 1)]);
        let repeated =
            WeightedDistribution::from_values([0.5, 0.25, 0.5, 1.0, 0.25, 0.5]);
        assert_eq!(weighted.total_weight(), 6);
        for q in [0.0, 12.5, 50.0, 80.0, 95.0, 99.0, 100.0] {
            assert_eq!(weighted.percentile(q), repeated.percentile(q));
        }
    }

    #[test]
    fn test_value_at_rank() {
        let dist = WeightedDistribution::from_weighted([(2.0, 2), (1.0, 1), (3.0, 0)]);
        assert_eq!(dist.value_at_rank(0), Some(1.0));
        assert_eq!(dist.value_at_rank(1), Some(2.0));
        assert_eq!(dist.value_at_rank(2), Some(2.0));
        assert_eq!(dist.value_at_rank(7), Some(2.0));
    }

    #[test]
    fn test_constant_distribution() {
        let dist = WeightedDistribution::from_weighted([(0.75, 1000)]);
        assert_eq!(dist.percentile(95.0), Some(0.75));
    }

    #[test]
    fn test_empty_distribution() {
        let dist = WeightedDistribution::from_values(std::iter::empty());
        assert!(dist.is_empty());
        assert_eq!(dist.percentile(50.0), None);
        assert_eq!(dist.value_at_rank(0), None);
    }

    #[test]
    fn test_single_point() {
        let dist = WeightedDistribution::from_values([0.3]);
        assert_eq!(dist.percentile(95.0), Some(0.3));
    }
}
