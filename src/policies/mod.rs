//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed request is retried
//! and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryConfig`] retry budget and exponential backoff (initial / max / jitter)
//! - [`Jitter`]      symmetric randomization to avoid synchronized retry storms
//! - [`RetryClass`]  retryable vs terminal classification of HTTP statuses
//! - [`NotFoundPolicy`] how a `NOT_FOUND` progress report ends a session
//!
//! ## Quick wiring
//! ```text
//! RetryConfig { max_retries, initial_delay, max_delay, jitter_fraction }
//!      └─► transport::RetryingTransport uses:
//!           - RetryClass::of_status(reply) to decide retry/return
//!           - delay_for_attempt(a) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `RetryConfig::default()` → retries=3, initial=1000ms, max=8000ms, jitter=0.3.
//! - Every delay is floored at [`MIN_RETRY_DELAY`] (100ms).

mod classify;
mod jitter;
mod not_found;
mod retry;

pub use classify::{RETRYABLE_STATUSES, RetryClass, is_success};
pub use jitter::Jitter;
pub use not_found::{NOT_FOUND_MESSAGE, NotFoundPolicy};
pub use retry::{MIN_RETRY_DELAY, RetryConfig};
