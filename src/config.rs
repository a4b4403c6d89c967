//! # Orchestrator configuration.
//!
//! [`OrchestratorConfig`] gathers every knob of one [`JobOrchestrator`](crate::JobOrchestrator):
//! the retry policy applied to each individual request, the fixed interval between progress
//! polls, the interpretation of `NOT_FOUND`, and the event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use jobvisor::{NotFoundPolicy, OrchestratorConfig, RetryConfig};
//!
//! let mut cfg = OrchestratorConfig::default();
//! cfg.poll_interval = Duration::from_millis(500);
//! cfg.retry = RetryConfig::with_retries(5);
//! cfg.not_found = NotFoundPolicy::Fail;
//!
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.retry.max_retries, 5);
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{NotFoundPolicy, RetryConfig};

/// Smallest poll interval the loop will actually wait.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for one orchestrator and the transport it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorConfig {
    /// Retry policy applied to every start, progress and result request.
    pub retry: RetryConfig,
    /// Fixed wait between progress polls (after `PENDING` and after transient errors).
    pub poll_interval: Duration,
    /// How a `NOT_FOUND` progress status ends the session.
    pub not_found: NotFoundPolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for OrchestratorConfig {
    /// Provides a default configuration:
    /// - `retry = RetryConfig::default()`
    /// - `poll_interval = 2000ms`
    /// - `not_found = NotFoundPolicy::Complete`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            poll_interval: Duration::from_millis(2000),
            not_found: NotFoundPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

impl OrchestratorConfig {
    /// Returns the bus capacity clamped to at least 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the poll interval, at least [`MIN_POLL_INTERVAL`].
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Validates the embedded retry policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()
    }
}
