//! # LogWriter: events rendered through `tracing`
//!
//! A minimal subscriber that forwards incoming [`Event`]s to the `tracing` macros
//! under the `jobvisor::events` target. Useful for demos and debugging; install any
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output
//! ```text
//! INFO  jobvisor::events: job requested subject=doc-7
//! DEBUG jobvisor::events: retry scheduled attempt=0 status=503 delay_ms=1180
//! INFO  jobvisor::events: job progress subject=doc-7 percent=40 detail="parsing"
//! WARN  jobvisor::events: transient poll error subject=doc-7 reason="i/o failure: reset"
//! INFO  jobvisor::events: job completed subject=doc-7
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "jobvisor::events";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let subject = e.subject.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::RetryScheduled => tracing::debug!(
                target: TARGET,
                attempt = ?e.attempt, status = ?e.status, delay_ms = ?e.delay_ms, reason,
                "retry scheduled"
            ),
            EventKind::RetriesExhausted => tracing::warn!(
                target: TARGET,
                attempt = ?e.attempt, status = ?e.status, reason,
                "retries exhausted"
            ),
            EventKind::RetryCanceled => {
                tracing::debug!(target: TARGET, attempt = ?e.attempt, "retry cancelled")
            }
            EventKind::JobRequested => tracing::info!(target: TARGET, subject, "job requested"),
            EventKind::JobStartFailed => tracing::warn!(
                target: TARGET,
                subject, status = ?e.status, reason,
                "start call failed; polling anyway"
            ),
            EventKind::JobPolling => tracing::debug!(target: TARGET, subject, "job polling"),
            EventKind::JobProgress => tracing::info!(
                target: TARGET,
                subject, percent = ?e.percent, detail = reason,
                "job progress"
            ),
            EventKind::PollTransientError => {
                tracing::warn!(target: TARGET, subject, reason, "transient poll error")
            }
            EventKind::JobNotFound => tracing::info!(target: TARGET, subject, "job not found"),
            EventKind::JobCompleted => tracing::info!(target: TARGET, subject, "job completed"),
            EventKind::JobFailed => tracing::warn!(target: TARGET, subject, reason, "job failed"),
            EventKind::JobCancelled => tracing::info!(target: TARGET, subject, "job cancelled"),
            EventKind::StartJoined => {
                tracing::debug!(target: TARGET, subject, "start joined active session")
            }
            EventKind::StartRejected => tracing::warn!(
                target: TARGET,
                subject, active = reason,
                "start rejected; orchestrator busy"
            ),
            EventKind::SubscriberOverflow => tracing::warn!(
                target: TARGET,
                subscriber = subject, reason,
                "subscriber overflow"
            ),
            EventKind::SubscriberPanicked => tracing::error!(
                target: TARGET,
                subscriber = subject, info = reason,
                "subscriber panicked"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
