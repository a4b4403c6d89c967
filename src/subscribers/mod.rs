//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in `LogWriter` (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   poll loop / transport ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                       │
//!                                                            ┌──────────┼──────────┐
//!                                                            ▼          ▼          ▼
//!                                                        LogWriter   Metrics    Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::JobFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
