//! Error types used by the transport, the orchestrator and configuration.
//!
//! This module defines the two independent error taxonomies of the crate:
//!
//! - [`TransportError`]: failures of a single logical request (retry taxonomy).
//! - [`PollError`]: transient failures while polling a job (never surfaced to callbacks).
//!
//! plus [`StartError`] for rejected `start()` calls and [`ConfigError`] for invalid settings.
//!
//! Every type provides `as_label` (stable snake_case for logs/metrics) in the same way.

use std::time::Duration;
use thiserror::Error;

use crate::jobs::JobSubject;

/// # Errors produced by one logical request.
///
/// `Io` is the only retryable variant. A response carrying an error status is **not**
/// an error at this level: it is returned as the outcome and classified by status code.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// I/O-level failure (timeout, connection reset, DNS failure, truncated body).
    #[error("i/o failure: {reason}")]
    Io {
        /// The underlying error message.
        reason: String,
    },

    /// The request could not be built or sent at all (bad URL, invalid header).
    #[error("invalid request: {reason}")]
    Request {
        /// The underlying error message.
        reason: String,
    },

    /// The caller cancelled while the request was waiting to be retried.
    #[error("request cancelled")]
    Canceled,
}

impl TransportError {
    /// Builds an [`TransportError::Io`] from anything printable.
    pub fn io(reason: impl ToString) -> Self {
        TransportError::Io {
            reason: reason.to_string(),
        }
    }

    /// Builds an [`TransportError::Request`] from anything printable.
    pub fn request(reason: impl ToString) -> Self {
        TransportError::Request {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::TransportError;
    ///
    /// assert_eq!(TransportError::Canceled.as_label(), "transport_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Io { .. } => "transport_io",
            TransportError::Request { .. } => "transport_request",
            TransportError::Canceled => "transport_canceled",
        }
    }

    /// Indicates whether another attempt may succeed.
    ///
    /// # Example
    /// ```
    /// use jobvisor::TransportError;
    ///
    /// assert!(TransportError::io("connection reset").is_retryable());
    /// assert!(!TransportError::request("bad url").is_retryable());
    /// assert!(!TransportError::Canceled.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Io { .. })
    }

    /// True for [`TransportError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TransportError::Canceled)
    }
}

/// # Transient failure of one progress poll.
///
/// The orchestrator logs these and polls again after the fixed interval; they never
/// reach the caller's callbacks and never abort the job.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The progress call failed below HTTP (after the transport's own retries).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The progress endpoint answered with a non-success status.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code of the reply.
        status: u16,
    },

    /// The progress body could not be decoded.
    #[error("undecodable progress body: {reason}")]
    Decode {
        /// The decoder message.
        reason: String,
    },
}

impl PollError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Transport(e) => e.as_label(),
            PollError::Status { .. } => "poll_status",
            PollError::Decode { .. } => "poll_decode",
        }
    }
}

/// Error returned by [`JobOrchestrator::start`](crate::JobOrchestrator::start).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Another subject is being polled by this orchestrator.
    #[error("orchestrator busy polling subject {active}")]
    Busy {
        /// Subject of the session that is still active.
        active: JobSubject,
    },
}

impl StartError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::Busy { .. } => "start_busy",
        }
    }
}

/// Invalid retry or polling configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `initial_delay` is larger than `max_delay`.
    #[error("initial delay {initial:?} exceeds max delay {max:?}")]
    InvalidDelays {
        /// Configured initial delay.
        initial: Duration,
        /// Configured cap.
        max: Duration,
    },

    /// `jitter_fraction` is not in `[0, 1)`.
    #[error("jitter fraction {fraction} outside [0, 1)")]
    InvalidJitter {
        /// Configured fraction.
        fraction: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidDelays { .. } => "config_invalid_delays",
            ConfigError::InvalidJitter { .. } => "config_invalid_jitter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_io_is_retryable() {
        assert!(TransportError::io("reset").is_retryable());
        assert!(!TransportError::request("bad").is_retryable());
        assert!(!TransportError::Canceled.is_retryable());
    }

    #[test]
    fn poll_error_wraps_transport_label() {
        let err = PollError::from(TransportError::io("timed out"));
        assert_eq!(err.as_label(), "transport_io");
        assert_eq!(err.to_string(), "i/o failure: timed out");
        assert_eq!(PollError::Status { status: 401 }.as_label(), "poll_status");
    }

    #[test]
    fn busy_names_active_subject() {
        let err = StartError::Busy {
            active: JobSubject::from("doc-7"),
        };
        assert_eq!(err.to_string(), "orchestrator busy polling subject doc-7");
    }
}
