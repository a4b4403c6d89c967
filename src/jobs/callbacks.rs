//! # Caller notifications for one poll session.
//!
//! [`JobCallbacks`] receives advisory progress and exactly one terminal notification:
//! either [`on_complete`](JobCallbacks::on_complete) or [`on_error`](JobCallbacks::on_error),
//! never both, never twice. Nothing is delivered after the session observes cancellation.
//!
//! Callbacks run on the poll task; keep them short and hand heavy work off elsewhere.
//!
//! [`CallbackFns`] adapts three closures to the trait.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobvisor::{CallbackFns, JobCallbacks, JobResult};
//!
//! let cb: Arc<dyn JobCallbacks> = CallbackFns::arc(
//!     |percent: u8, message: &str| println!("{percent}% {message}"),
//!     |result: JobResult| println!("done: {} bytes", result.as_bytes().len()),
//!     |error: &str| eprintln!("failed: {error}"),
//! );
//! cb.on_progress(10, "queued");
//! ```

use std::sync::Arc;

use crate::jobs::progress::JobResult;

/// Receives notifications from a poll session.
pub trait JobCallbacks: Send + Sync + 'static {
    /// A `PENDING` report arrived. Advisory only; default does nothing.
    fn on_progress(&self, percent: u8, message: &str) {
        let _ = (percent, message);
    }

    /// The job completed; `result` is handed over and not retained.
    fn on_complete(&self, result: JobResult);

    /// The job failed (or its result could not be fetched).
    fn on_error(&self, message: &str);
}

/// Closure-backed [`JobCallbacks`].
pub struct CallbackFns<P, C, E> {
    on_progress: P,
    on_complete: C,
    on_error: E,
}

impl<P, C, E> CallbackFns<P, C, E>
where
    P: Fn(u8, &str) + Send + Sync + 'static,
    C: Fn(JobResult) + Send + Sync + 'static,
    E: Fn(&str) + Send + Sync + 'static,
{
    /// Wraps the three closures.
    pub fn new(on_progress: P, on_complete: C, on_error: E) -> Self {
        Self {
            on_progress,
            on_complete,
            on_error,
        }
    }

    /// Wraps the three closures into a shared handle.
    pub fn arc(on_progress: P, on_complete: C, on_error: E) -> Arc<Self> {
        Arc::new(Self::new(on_progress, on_complete, on_error))
    }
}

impl<P, C, E> JobCallbacks for CallbackFns<P, C, E>
where
    P: Fn(u8, &str) + Send + Sync + 'static,
    C: Fn(JobResult) + Send + Sync + 'static,
    E: Fn(&str) + Send + Sync + 'static,
{
    fn on_progress(&self, percent: u8, message: &str) {
        (self.on_progress)(percent, message)
    }

    fn on_complete(&self, result: JobResult) {
        (self.on_complete)(result)
    }

    fn on_error(&self, message: &str) {
        (self.on_error)(message)
    }
}
