//! Long-running server-side jobs: start, poll, deliver.
//!
//! ## Contents
//! - [`JobOrchestrator`], [`OrchestratorBuilder`] single-session slot and poll task spawning
//! - [`JobHandle`], [`JobState`] the caller's view of a session
//! - [`JobCallbacks`], [`CallbackFns`] progress and terminal notifications
//! - [`JobClient`] the start/progress/result endpoints over the retrying transport
//! - [`JobSubject`], [`JobStatus`], [`JobProgress`], [`JobResult`] wire-level values
//!
//! ## Flow
//! ```text
//! start(subject) ──► slot ──► Poller::run (spawned)
//!                               ├─► JobClient::start
//!                               ├─► loop JobClient::progress ─► on_progress
//!                               └─► JobClient::result ─► on_complete | on_error
//! ```

mod callbacks;
mod client;
mod orchestrator;
mod poller;
mod progress;
mod session;
mod subject;

pub use callbacks::{CallbackFns, JobCallbacks};
pub use client::JobClient;
pub use orchestrator::{JobOrchestrator, OrchestratorBuilder};
pub use progress::{JobProgress, JobResult, JobStatus};
pub use session::{JobHandle, JobState};
pub use subject::JobSubject;
