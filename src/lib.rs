//! # jobvisor
//!
//! **Jobvisor** is a resilient request and long-job orchestration core for Rust.
//!
//! It provides two building blocks:
//! - [`RetryingTransport`]: retries one logical request on transient failure with
//!   exponential backoff and jitter, around any "perform one attempt" closure.
//! - [`JobOrchestrator`]: starts a server-side job, polls its progress on a cancellable
//!   background task, and reports progress and exactly one terminal outcome through
//!   callbacks. At most one poll session runs per orchestrator.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        caller
//!          │ start(subject, callbacks) / cancel(handle)
//!          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  JobOrchestrator                                                  │
//! │  - single session slot (join same subject, reject others)         │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼ tokio::spawn
//!     ┌──────────────┐      ┌────────────────────┐      ┌───────────────┐
//!     │    Poller    │ ───► │     JobClient      │ ───► │   Exchange    │
//!     │ (poll loop)  │      │ start/progress/    │      │ (one attempt, │
//!     └┬─────────────┘      │ result             │      │  HttpExchange)│
//!      │                    └─────────┬──────────┘      └───────────────┘
//!      │ Publishes                    │ RetryingTransport::execute
//!      │ - JobPolling                 │ Publishes
//!      │ - JobProgress                │ - RetryScheduled
//!      │ - PollTransientError         │ - RetriesExhausted
//!      │ - JobCompleted / JobFailed   │ - RetryCanceled
//!      ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │            (capacity: OrchestratorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──start()──► Requested ──► Polling ──┬─► Completed (on_complete)
//!                       │            │      └─► Failed    (on_error)
//!                       └────────────┴────────► Cancelled (no callback)
//!
//! Polling:
//! loop {
//!   ├─► token cancelled?                 → Cancelled
//!   ├─► GET jobs/{subject}/progress      (retried per RetryConfig)
//!   │     ├─ transport/status/decode error → transient, wait, loop
//!   │     ├─ PENDING                       → on_progress, wait, loop
//!   │     ├─ COMPLETED                     → GET result → on_complete
//!   │     ├─ NOT_FOUND                     → NotFoundPolicy
//!   │     └─ FAILED                        → on_error
//!   └─► wait(poll_interval)              (cancellable)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Retry**         | Backoff, jitter and status classification.                   | [`RetryConfig`], [`Jitter`], [`RetryClass`] |
//! | **Transport**     | One-attempt seam, retry loop, reqwest implementation.        | [`Exchange`], [`RetryingTransport`], [`HttpExchange`] |
//! | **Jobs**          | Start/poll/deliver with a single-session slot.               | [`JobOrchestrator`], [`JobHandle`], [`JobCallbacks`] |
//! | **Subscriber API**| Hook into transport and job events.                          | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors with stable labels.                             | [`TransportError`], [`PollError`], [`StartError`] |
//! | **Configuration** | One object for retry and polling settings.                   | [`OrchestratorConfig`]                      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber rendering events via `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use jobvisor::{HttpExchange, JobOrchestrator, JobResult, JobState, OrchestratorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exchange = Arc::new(HttpExchange::new("https://api.example.com/v1/")?);
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn jobvisor::Subscribe>> = vec![Arc::new(jobvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn jobvisor::Subscribe>> = Vec::new();
//!
//!     let orchestrator = JobOrchestrator::builder(OrchestratorConfig::default(), exchange)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let handle = orchestrator.start_with(
//!         "doc-42",
//!         |percent: u8, message: &str| println!("{percent}% {message}"),
//!         |result: JobResult| println!("result: {} bytes", result.as_bytes().len()),
//!         |error: &str| eprintln!("job failed: {error}"),
//!     )?;
//!
//!     assert!(matches!(
//!         handle.wait().await,
//!         JobState::Completed | JobState::Failed | JobState::Cancelled
//!     ));
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod events;
mod jobs;
mod policies;
mod subscribers;
mod transport;

// ---- Public re-exports ----

pub use config::{MIN_POLL_INTERVAL, OrchestratorConfig};
pub use error::{ConfigError, PollError, StartError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{
    CallbackFns, JobCallbacks, JobClient, JobHandle, JobOrchestrator, JobProgress, JobResult,
    JobState, JobStatus, JobSubject, OrchestratorBuilder,
};
pub use policies::{
    Jitter, MIN_RETRY_DELAY, NOT_FOUND_MESSAGE, NotFoundPolicy, RETRYABLE_STATUSES, RetryClass,
    RetryConfig, is_success,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use transport::{
    ApiRequest, Exchange, HttpExchange, Method, Reply, RequestDecorator, Response, RetryOutcome,
    RetryingTransport, Sleeper, StaticHeaders, TokioSleeper, wait_or_cancel,
};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
