//! # Runtime events emitted by the transport and the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Transport events**: retry scheduling, exhaustion and cancellation
//! - **Job events**: session lifecycle (requested, polling, progress, terminal states)
//! - **Subscriber events**: overflow and panic reports from subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job subject,
//! attempt numbers, HTTP statuses and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_subject("doc-42")
//!     .with_status(503)
//!     .with_attempt(1)
//!     .with_delay(Duration::from_millis(1200));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.subject.as_deref(), Some("doc-42"));
//! assert_eq!(ev.delay_ms, Some(1200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Transport events ===
    /// A retryable failure was observed; the next attempt is scheduled.
    ///
    /// Sets:
    /// - `attempt`: attempt index that failed (0-based)
    /// - `delay_ms`: wait before the next attempt
    /// - `status`: HTTP status (absent for I/O failures)
    /// - `reason`: failure message (I/O failures only)
    RetryScheduled,

    /// The retry budget is spent; the last failure is returned to the caller.
    ///
    /// Sets:
    /// - `attempt`: last attempt index
    /// - `status` or `reason`: the final failure
    RetriesExhausted,

    /// A backoff wait was interrupted by cancellation.
    ///
    /// Sets:
    /// - `attempt`: attempt index whose retry was abandoned
    RetryCanceled,

    // === Job lifecycle events ===
    /// `start()` created a session and is issuing the start call.
    ///
    /// Sets:
    /// - `subject`: job subject
    JobRequested,

    /// The start call failed; polling proceeds anyway.
    ///
    /// Sets:
    /// - `subject`: job subject
    /// - `status` or `reason`: the failure
    JobStartFailed,

    /// The session entered the poll loop.
    ///
    /// Sets:
    /// - `subject`: job subject
    JobPolling,

    /// A `PENDING` progress report was delivered.
    ///
    /// Sets:
    /// - `subject`: job subject
    /// - `percent`: percent complete
    /// - `reason`: server message
    JobProgress,

    /// A progress poll failed transiently; the loop waits and polls again.
    ///
    /// Sets:
    /// - `subject`: job subject
    /// - `reason`: failure message
    PollTransientError,

    /// The server reported `NOT_FOUND` for the subject.
    ///
    /// Always followed by `JobCompleted` or `JobFailed` depending on
    /// [`NotFoundPolicy`](crate::NotFoundPolicy).
    ///
    /// Sets:
    /// - `subject`: job subject
    JobNotFound,

    /// `on_complete` was delivered.
    ///
    /// Sets:
    /// - `subject`: job subject
    JobCompleted,

    /// `on_error` was delivered.
    ///
    /// Sets:
    /// - `subject`: job subject
    /// - `reason`: error message handed to the callback
    JobFailed,

    /// The session observed its cancellation token and stopped.
    ///
    /// Sets:
    /// - `subject`: job subject
    JobCancelled,

    /// `start()` joined the already-active session for the same subject.
    ///
    /// Sets:
    /// - `subject`: job subject
    StartJoined,

    /// `start()` was rejected because another subject is active.
    ///
    /// Sets:
    /// - `subject`: rejected subject
    /// - `reason`: active subject
    StartRejected,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Backoff delay before next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, messages, overflow details).
    pub reason: Option<Arc<str>>,
    /// Attempt index (0-based, per logical request).
    pub attempt: Option<u32>,
    /// HTTP status code, if a reply was observed.
    pub status: Option<u16>,
    /// Percent complete reported by the server.
    pub percent: Option<u8>,
    /// Job subject (or subscriber name for subscriber events).
    pub subject: Option<Arc<str>>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            attempt: None,
            reason: None,
            delay_ms: None,
            status: None,
            percent: None,
            subject: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a job subject.
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an attempt index.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches an HTTP status.
    #[inline]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a percent-complete value (clamped to 100).
    #[inline]
    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent.min(100));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for the events that end a poll session.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::JobCompleted | EventKind::JobFailed | EventKind::JobCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::JobPolling);
        let b = Event::new(EventKind::JobPolling);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_saturates_at_u32() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn terminal_kinds() {
        assert!(Event::new(EventKind::JobCompleted).is_terminal());
        assert!(Event::new(EventKind::JobCancelled).is_terminal());
        assert!(!Event::new(EventKind::JobNotFound).is_terminal());
    }
}
