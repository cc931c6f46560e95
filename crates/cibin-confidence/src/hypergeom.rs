//! Confidence bounds for the number of "good" items in a finite population
//!
//! A sample of `n` items is drawn without replacement from a population of
//! `N`, of which `G` are good; the number of good items drawn is
//! `X ~ Hypergeometric(N, G, n)`. Given an observed `x`, this module bounds
//! `G` in two ways:
//!
//! - [`hypergeom_conf_interval`]: inverts one-sided tail tests, with an
//!   integer binary search over the monotone tail probabilities
//! - [`sterne_conf_interval`]: inverts the smallest acceptance regions built
//!   by [`hypergeom_accept`] (Sterne's method)

use crate::types::{Alternative, ConfidenceLevel};
use cibin_core::{Error, Result};
use statrs::distribution::{Discrete, Hypergeometric};
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

/// Slack allowed when comparing accumulated probabilities with alpha
const PROBABILITY_TOLERANCE: f64 = 1e-12;

/// Relative gap under which two masses count as equal
const TIE_TOLERANCE: f64 = 1e-9;

/// Sample values a level-α hypergeometric test does not reject
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceRegion {
    values: RangeInclusive<u64>,
    rejected_probability: f64,
}

impl AcceptanceRegion {
    /// Accepted values, always a contiguous run of the support
    pub fn values(&self) -> RangeInclusive<u64> {
        self.values.clone()
    }

    pub fn lower(&self) -> u64 {
        *self.values.start()
    }

    pub fn upper(&self) -> u64 {
        *self.values.end()
    }

    pub fn contains(&self, x: u64) -> bool {
        self.values.contains(&x)
    }

    pub fn len(&self) -> usize {
        if self.values.is_empty() {
            0
        } else {
            (self.upper() - self.lower() + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Probability mass of the removed tails
    pub fn rejected_probability(&self) -> f64 {
        self.rejected_probability
    }
}

fn distribution(population: u64, good: u64, draws: u64) -> Result<Hypergeometric> {
    Hypergeometric::new(population, good, draws).map_err(|e| {
        Error::Computation(format!(
            "Failed to create hypergeometric distribution (N={population}, G={good}, n={draws}): {e}"
        ))
    })
}

/// Probability of drawing `k` good items, evaluated in log space
///
/// statrs' `pmf` divides raw binomial coefficients, which overflow to
/// infinity once `C(N, n)` passes `f64::MAX`; `ln_pmf` stays finite.
fn mass(dist: &Hypergeometric, k: u64) -> f64 {
    dist.ln_pmf(k).exp()
}

fn check_population(population: u64, good: u64, draws: u64) -> Result<()> {
    if good > population {
        return Err(Error::PreconditionFailed(format!(
            "good items G={good} exceed population N={population}"
        )));
    }
    if draws > population {
        return Err(Error::PreconditionFailed(format!(
            "sample size n={draws} exceeds population N={population}"
        )));
    }
    Ok(())
}

/// Smallest acceptance region for `X ~ Hypergeometric(N, G, n)` at level `cl`
///
/// Starting from `{0, …, n}`, the less probable of the two extreme values is
/// moved into the rejection tail (both on a tie, up to rounding) until the
/// tail reaches
/// `α = 1 − cl`.
///
/// - `randomized = false`: a removal that would push the tail above α is not
///   made, so the rejected mass never exceeds α (conservative test).
/// - `randomized = true`: removals continue while the tail is below α, so the
///   last removal may overshoot; a deterministic decision at exactly level α
///   would need an auxiliary randomization on that last value. The region is
///   never emptied.
///
/// Fails with [`Error::PreconditionFailed`] unless `G ≤ N`, `n ≤ N` and
/// `0 < cl < 1`.
#[instrument(level = "debug")]
pub fn hypergeom_accept(
    population: u64,
    good: u64,
    draws: u64,
    cl: f64,
    randomized: bool,
) -> Result<AcceptanceRegion> {
    let alpha = ConfidenceLevel::new(cl)?.alpha();
    check_population(population, good, draws)?;
    let dist = distribution(population, good, draws)?;

    let (mut bottom, mut top) = (0i64, draws as i64);
    let mut tail = 0.0;
    while bottom <= top {
        if randomized && tail >= alpha - PROBABILITY_TOLERANCE {
            break;
        }
        let p_bottom = mass(&dist, bottom as u64);
        let p_top = mass(&dist, top as u64);
        // Log-space masses of mirrored values can differ in the last bits
        let tied = (p_bottom - p_top).abs() <= TIE_TOLERANCE * p_bottom.max(p_top);
        let (removed, next_bottom, next_top) = if bottom == top {
            (p_bottom, bottom + 1, top)
        } else if tied {
            (p_bottom + p_top, bottom + 1, top - 1)
        } else if p_bottom < p_top {
            (p_bottom, bottom + 1, top)
        } else {
            (p_top, bottom, top - 1)
        };
        if !randomized && tail + removed > alpha + PROBABILITY_TOLERANCE {
            break;
        }
        if randomized && next_bottom > next_top {
            break;
        }
        tail += removed;
        bottom = next_bottom;
        top = next_top;
    }

    if !tail.is_finite() {
        return Err(Error::Computation(format!(
            "non-finite tail probability for N={population}, G={good}, n={draws}"
        )));
    }
    let values = if bottom <= top {
        bottom as u64..=top as u64
    } else {
        // Empty region, kept as an empty range
        1..=0
    };
    Ok(AcceptanceRegion {
        values,
        rejected_probability: tail,
    })
}

/// `P(X ≥ x)` by direct summation over the support
fn upper_tail(dist: &Hypergeometric, population: u64, good: u64, draws: u64, x: u64) -> f64 {
    let max = good.min(draws);
    let min = (good + draws).saturating_sub(population);
    (x.max(min)..=max).map(|k| mass(dist, k)).sum()
}

/// `P(X ≤ x)` by direct summation over the support
fn lower_tail(dist: &Hypergeometric, population: u64, good: u64, draws: u64, x: u64) -> f64 {
    let max = good.min(draws);
    let min = (good + draws).saturating_sub(population);
    if x < min {
        return 0.0;
    }
    (min..=x.min(max)).map(|k| mass(dist, k)).sum()
}

/// First `g` in `[lo, hi]` with `pred(g)`, for predicates that switch from
/// false to true once; `seed` narrows the bracket before bisection
fn first_true<F>(mut lo: u64, mut hi: u64, seed: u64, mut pred: F) -> Result<u64>
where
    F: FnMut(u64) -> Result<bool>,
{
    let seed = seed.clamp(lo, hi);
    if pred(seed)? {
        hi = seed;
    } else {
        lo = (seed + 1).min(hi);
    }
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid)? {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(lo)
}

/// Confidence bounds `(ci_low, ci_upp)` for the number of good items `G`
///
/// With `alpha_tail = 1 − cl` for one-sided alternatives and `(1 − cl) / 2`
/// for two-sided:
///
/// - `ci_low` is the smallest `G` with `P_G(X ≥ x) ≥ alpha_tail` (`0` if
///   `x = 0` or for [`Alternative::Upper`])
/// - `ci_upp` is the largest `G` with `P_G(X ≤ x) ≥ alpha_tail` (`N` if
///   `x = n` or for [`Alternative::Lower`])
///
/// `seed` is an initial guess for `G` used to bracket both searches; it
/// defaults to `round(N · x / n)`.
///
/// Fails with [`Error::PreconditionFailed`] unless `x ≤ n ≤ N`, `0 < cl < 1`
/// and `seed ≤ N`.
#[instrument(level = "debug")]
pub fn hypergeom_conf_interval(
    draws: u64,
    x: u64,
    population: u64,
    cl: f64,
    alternative: Alternative,
    seed: Option<u64>,
) -> Result<(u64, u64)> {
    let level = ConfidenceLevel::new(cl)?;
    if x > draws {
        return Err(Error::PreconditionFailed(format!(
            "observed x={x} exceeds sample size n={draws}"
        )));
    }
    check_population(population, 0, draws)?;
    if let Some(g) = seed {
        if g > population {
            return Err(Error::PreconditionFailed(format!(
                "seed G={g} exceeds population N={population}"
            )));
        }
    }

    let alpha_tail = match alternative {
        Alternative::TwoSided => level.tail_probability(),
        Alternative::Lower | Alternative::Upper => level.alpha(),
    };
    let seed = seed.unwrap_or_else(|| {
        if draws == 0 {
            population / 2
        } else {
            (population as f64 * x as f64 / draws as f64).round() as u64
        }
    });

    let ci_low = if alternative == Alternative::Upper || x == 0 {
        0
    } else {
        // P_G(X ≥ x) grows with G and equals 1 at G = N
        first_true(x, population, seed, |g| {
            let dist = distribution(population, g, draws)?;
            Ok(upper_tail(&dist, population, g, draws, x) >= alpha_tail - PROBABILITY_TOLERANCE)
        })?
    };

    let ci_upp = if alternative == Alternative::Lower || x == draws {
        population
    } else {
        // P_G(X ≤ x) shrinks with G and is 0 once G > N − (n − x); find the
        // first G where it drops below alpha_tail and step back one
        let last_feasible = population - (draws - x);
        let first_rejected = first_true(0, last_feasible + 1, seed, |g| {
            if g > last_feasible {
                return Ok(true);
            }
            let dist = distribution(population, g, draws)?;
            Ok(lower_tail(&dist, population, g, draws, x) < alpha_tail - PROBABILITY_TOLERANCE)
        })?;
        first_rejected.saturating_sub(1)
    };

    debug!(ci_low, ci_upp, %alternative, "hypergeometric interval");
    Ok((ci_low, ci_upp))
}

/// Sterne confidence bounds: the `G` whose acceptance region contains `x`
///
/// Scans every `G` in `[x, N − (n − x)]` and returns the smallest and
/// largest one for which [`hypergeom_accept`] accepts `x`. Sterne regions
/// need not be nested in `G`, so the scan is exhaustive.
///
/// Fails with [`Error::PreconditionFailed`] unless `x ≤ n ≤ N` and
/// `0 < cl < 1`.
#[instrument(level = "debug")]
pub fn sterne_conf_interval(
    draws: u64,
    x: u64,
    population: u64,
    cl: f64,
    randomized: bool,
) -> Result<(u64, u64)> {
    ConfidenceLevel::new(cl)?;
    if x > draws {
        return Err(Error::PreconditionFailed(format!(
            "observed x={x} exceeds sample size n={draws}"
        )));
    }
    check_population(population, 0, draws)?;

    let mut bounds: Option<(u64, u64)> = None;
    for g in x..=population - (draws - x) {
        if hypergeom_accept(population, g, draws, cl, randomized)?.contains(x) {
            bounds = Some(match bounds {
                Some((low, _)) => (low, g),
                None => (g, g),
            });
        }
    }
    bounds.ok_or_else(|| {
        Error::Computation(format!(
            "no population count accepts x={x} (n={draws}, N={population}, cl={cl})"
        ))
    })
}
