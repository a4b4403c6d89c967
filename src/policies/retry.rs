//! # Retry configuration and exponential backoff.
//!
//! [`RetryConfig`] controls how many times a transient failure is retried and how long
//! the transport waits between attempts. It is parameterized by:
//! - [`RetryConfig::max_retries`] the number of retries after the first attempt;
//! - [`RetryConfig::initial_delay`] the delay before the first retry;
//! - [`RetryConfig::max_delay`] the cap on the exponential part;
//! - [`RetryConfig::jitter_fraction`] the symmetric jitter applied after capping.
//!
//! For attempt index `a` (0-based) the wait is
//! `max(min(initial × 2^a, max) × (1 + U(-f, +f)), 100ms)`.
//! The base delay is derived purely from the attempt index, so jitter output never
//! feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::RetryConfig;
//!
//! let cfg = RetryConfig::default();
//!
//! assert_eq!(cfg.base_delay(0), Duration::from_millis(1000));
//! assert_eq!(cfg.base_delay(2), Duration::from_millis(4000));
//! // 1000ms × 2^4 = 16s → capped at max=8s
//! assert_eq!(cfg.base_delay(4), Duration::from_millis(8000));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::jitter::Jitter;

/// Floor applied to every post-jitter retry delay.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Growth factor between consecutive base delays.
const BACKOFF_FACTOR: f64 = 2.0;

/// Retry and backoff settings for one logical request.
///
/// Immutable value object; supplied at transport construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt (`0` = single attempt).
    pub max_retries: u32,
    /// Base delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the exponential base delay (jitter may exceed it by `jitter_fraction`).
    pub max_delay: Duration,
    /// Symmetric jitter fraction, `0 <= f < 1`.
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    /// Returns a config with:
    /// - `max_retries = 3`;
    /// - `initial_delay = 1000ms`;
    /// - `max_delay = 8000ms`;
    /// - `jitter_fraction = 0.3`.
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(8000),
            jitter_fraction: 0.3,
        }
    }
}

impl RetryConfig {
    /// Default config with a different retry count.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Config that never retries.
    pub fn no_retry() -> Self {
        Self::with_retries(0)
    }

    /// Checks the invariants the transport relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_delay > self.max_delay {
            return Err(ConfigError::InvalidDelays {
                initial: self.initial_delay,
                max: self.max_delay,
            });
        }
        if !self.jitter_fraction.is_finite()
            || self.jitter_fraction < 0.0
            || self.jitter_fraction >= 1.0
        {
            return Err(ConfigError::InvalidJitter {
                fraction: self.jitter_fraction,
            });
        }
        Ok(())
    }

    /// Returns the jitter fraction clamped into `[0, 1)`.
    #[inline]
    pub fn jitter_fraction_clamped(&self) -> f64 {
        self.jitter().fraction()
    }

    /// Returns the jitter derived from [`RetryConfig::jitter_fraction`].
    #[inline]
    pub fn jitter(&self) -> Jitter {
        Jitter::new(self.jitter_fraction)
    }

    /// Computes the pre-jitter delay for the given attempt index (0-indexed).
    ///
    /// `initial × 2^attempt`, clamped to [`RetryConfig::max_delay`]. Overflowing or
    /// non-finite intermediate values clamp to the cap as well.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let max_secs = self.max_delay.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.initial_delay.as_secs_f64() * BACKOFF_FACTOR.powi(clamped_exp);

        if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
            self.max_delay
        } else {
            Duration::from_secs_f64(unclamped_secs)
        }
    }

    /// Computes the actual wait before retry `attempt + 1`: jittered base with a
    /// [`MIN_RETRY_DELAY`] floor.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.jitter()
            .apply(self.base_delay(attempt))
            .max(MIN_RETRY_DELAY)
    }

    /// Largest value [`delay_for_attempt`](Self::delay_for_attempt) can return.
    pub fn max_delay_for_attempt(&self, attempt: u32) -> Duration {
        self.jitter()
            .upper_bound(self.base_delay(attempt))
            .max(MIN_RETRY_DELAY)
    }

    /// Smallest value [`delay_for_attempt`](Self::delay_for_attempt) can return.
    pub fn min_delay_for_attempt(&self, attempt: u32) -> Duration {
        self.jitter()
            .lower_bound(self.base_delay(attempt))
            .max(MIN_RETRY_DELAY)
    }

    /// Deterministic upper bound on the total backoff one `execute` call can sleep.
    pub fn max_total_wait(&self) -> Duration {
        (0..self.max_retries)
            .map(|a| self.max_delay_for_attempt(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryConfig {
        RetryConfig {
            jitter_fraction: 0.0,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn test_exponential_growth_then_cap() {
        let cfg = no_jitter();
        let expected = [1000, 2000, 4000, 8000, 8000, 8000];
        for (attempt, ms) in expected.iter().enumerate() {
            assert_eq!(
                cfg.delay_for_attempt(attempt as u32),
                Duration::from_millis(*ms),
                "attempt {attempt}"
            );
        }
    }

    #[test]
    fn test_floor_applies_to_tiny_delays() {
        let cfg = RetryConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            jitter_fraction: 0.0,
            max_retries: 3,
        };
        assert_eq!(cfg.delay_for_attempt(0), MIN_RETRY_DELAY);
        assert_eq!(cfg.delay_for_attempt(5), MIN_RETRY_DELAY);
    }

    #[test]
    fn test_jittered_delays_respect_global_bounds() {
        let cfg = RetryConfig::default();
        let ceiling = cfg.max_delay.mul_f64(1.3);
        for attempt in 0..=cfg.max_retries + 5 {
            for _ in 0..100 {
                let d = cfg.delay_for_attempt(attempt);
                assert!(d >= MIN_RETRY_DELAY, "attempt {attempt}: {d:?} below floor");
                assert!(d <= ceiling, "attempt {attempt}: {d:?} above ceiling");
            }
        }
    }

    #[test]
    fn test_per_attempt_jitter_window() {
        let cfg = RetryConfig::default();
        let windows = [(700, 1300), (1400, 2600), (2800, 5200), (5600, 10400)];
        for (attempt, (lo, hi)) in windows.iter().enumerate() {
            let a = attempt as u32;
            assert_eq!(cfg.min_delay_for_attempt(a), Duration::from_millis(*lo));
            assert_eq!(cfg.max_delay_for_attempt(a), Duration::from_millis(*hi));
        }
    }

    #[test]
    fn test_huge_attempt_clamps_to_max() {
        let cfg = no_jitter();
        assert_eq!(cfg.base_delay(100), cfg.max_delay);
        assert_eq!(cfg.base_delay(u32::MAX), cfg.max_delay);
    }

    #[test]
    fn test_max_total_wait_sums_upper_bounds() {
        // 1.3 × (1000 + 2000 + 4000)
        assert_eq!(
            RetryConfig::default().max_total_wait(),
            Duration::from_millis(9100)
        );
        assert_eq!(RetryConfig::no_retry().max_total_wait(), Duration::ZERO);
    }

    #[test]
    fn test_validate() {
        assert!(RetryConfig::default().validate().is_ok());

        let inverted = RetryConfig {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..RetryConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidDelays { .. })
        ));

        let wide = RetryConfig {
            jitter_fraction: 1.0,
            ..RetryConfig::default()
        };
        assert!(matches!(wide.validate(), Err(ConfigError::InvalidJitter { .. })));
    }
}
