//! # Symmetric jitter for retry delays.
//!
//! [`Jitter`] perturbs a computed backoff delay by a uniformly drawn factor in
//! `[1 - fraction, 1 + fraction]`, so that many clients retrying the same failure do
//! not hit the server in lock-step.
//!
//! - `fraction = 0.0`: no randomization, predictable delays
//! - `fraction = 0.3`: delay lands anywhere in `[0.7 × base, 1.3 × base]`
//!
//! The fraction is clamped into `[0, MAX_FRACTION]`; a value of `1.0` or above would
//! allow a zero delay and is never used.

use rand::Rng;
use std::time::Duration;

/// Largest fraction accepted; keeps `1 - fraction` strictly positive.
pub const MAX_FRACTION: f64 = 0.999;

/// Fraction-based symmetric jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jitter {
    fraction: f64,
}

impl Default for Jitter {
    /// No jitter.
    fn default() -> Self {
        Self { fraction: 0.0 }
    }
}

impl Jitter {
    /// Creates a jitter with the given fraction (clamped, NaN becomes `0`).
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, MAX_FRACTION)
        } else {
            0.0
        };
        Self { fraction }
    }

    /// Returns the effective fraction.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Applies a freshly drawn jitter factor to `base`.
    pub fn apply(&self, base: Duration) -> Duration {
        if self.fraction == 0.0 || base.is_zero() {
            return base;
        }
        let offset = rand::rng().random_range(-self.fraction..=self.fraction);
        self.apply_offset(base, offset)
    }

    /// Applies an explicit offset (clamped to `±fraction`) to `base`.
    ///
    /// Deterministic counterpart of [`apply`](Self::apply), used for bounds.
    pub fn apply_offset(&self, base: Duration, offset: f64) -> Duration {
        let offset = offset.clamp(-self.fraction, self.fraction);
        let nanos = (base.as_nanos() as f64 * (1.0 + offset)).round();
        if nanos >= u64::MAX as f64 {
            return Duration::from_nanos(u64::MAX);
        }
        Duration::from_nanos(nanos as u64)
    }

    /// Largest delay [`apply`](Self::apply) can return for `base`.
    pub fn upper_bound(&self, base: Duration) -> Duration {
        self.apply_offset(base, self.fraction)
    }

    /// Smallest delay [`apply`](Self::apply) can return for `base`.
    pub fn lower_bound(&self, base: Duration) -> Duration {
        self.apply_offset(base, -self.fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fraction_is_identity() {
        let j = Jitter::new(0.0);
        assert_eq!(j.apply(Duration::from_millis(1234)), Duration::from_millis(1234));
    }

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(Jitter::new(-1.0).fraction(), 0.0);
        assert_eq!(Jitter::new(5.0).fraction(), MAX_FRACTION);
        assert_eq!(Jitter::new(f64::NAN).fraction(), 0.0);
    }

    #[test]
    fn apply_stays_within_bounds() {
        let j = Jitter::new(0.3);
        let base = Duration::from_millis(1000);
        for _ in 0..500 {
            let d = j.apply(base);
            assert!(d >= Duration::from_millis(700), "{d:?} below 0.7 × base");
            assert!(d <= Duration::from_millis(1300), "{d:?} above 1.3 × base");
        }
    }

    #[test]
    fn bounds_match_fraction() {
        let j = Jitter::new(0.3);
        let base = Duration::from_millis(2000);
        assert_eq!(j.lower_bound(base), Duration::from_millis(1400));
        assert_eq!(j.upper_bound(base), Duration::from_millis(2600));
    }
}
