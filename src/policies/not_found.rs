//! # Handling of `NOT_FOUND` progress reports.
//!
//! A `NOT_FOUND` status means the server has no in-flight job for the subject. That is
//! ambiguous: the job may have finished and been reaped (its result still retrievable),
//! or it may never have existed. [`NotFoundPolicy`] makes the interpretation explicit.
//!
//! - [`NotFoundPolicy::Complete`] resolves it as success: fetch the result, `on_complete` (default).
//! - [`NotFoundPolicy::Fail`] resolves it as failure: `on_error("job not found")`, no result fetch.
//!
//! Either way the loop publishes a dedicated `JobNotFound` event first, so the two
//! terminal paths stay distinguishable in logs.

/// Message handed to `on_error` under [`NotFoundPolicy::Fail`].
pub const NOT_FOUND_MESSAGE: &str = "job not found";

/// Interpretation of a `NOT_FOUND` progress status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Treat as already completed: fetch the result and deliver `on_complete`.
    #[default]
    Complete,
    /// Treat as a job failure: deliver `on_error`.
    Fail,
}
