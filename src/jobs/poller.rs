//! # Poller: drives one session to a terminal state.
//!
//! Runs as a single background task per session, spawned by
//! [`JobOrchestrator::start`](crate::JobOrchestrator::start).
//!
//! ## Loop
//! ```text
//! start call (outcome ignored except for logging)   state: Requested
//!   │
//!   ▼                                               state: Polling
//! loop {
//!   ├─► cancelled?                         → Cancelled
//!   ├─► progress call
//!   ├─► cancelled?                         → Cancelled   (late reply discarded)
//!   ├─► Err(PollError)                     → PollTransientError, wait
//!   ├─► PENDING                            → on_progress, wait
//!   ├─► COMPLETED                          → fetch result → on_complete | on_error
//!   ├─► NOT_FOUND                          → per NotFoundPolicy
//!   ├─► FAILED                             → on_error(failure_message)
//!   └─► wait(poll_interval) (cancellable)  → cancelled? Cancelled
//! }
//! ```
//!
//! ## Rules
//! - Exactly one terminal callback per session; none after cancellation is observed.
//! - The token is checked before every network call and before every callback.
//! - Transient poll errors never reach the callbacks and never end the session.
//! - The terminal callback runs **before** the state becomes terminal, so a caller
//!   awaiting [`JobHandle::wait`](crate::JobHandle::wait) sees its side effects.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::jobs::callbacks::JobCallbacks;
use crate::jobs::client::JobClient;
use crate::jobs::progress::{JobProgress, JobStatus};
use crate::jobs::session::{JobState, PollSession};
use crate::policies::{NOT_FOUND_MESSAGE, NotFoundPolicy};
use crate::transport::{Sleeper, wait_or_cancel};

/// Parameters a poller takes from [`OrchestratorConfig`](crate::OrchestratorConfig).
#[derive(Clone, Copy, Debug)]
pub(crate) struct PollerParams {
    pub poll_interval: Duration,
    pub not_found: NotFoundPolicy,
}

pub(crate) struct Poller {
    pub client: JobClient,
    pub session: Arc<PollSession>,
    pub callbacks: Arc<dyn JobCallbacks>,
    pub sleeper: Arc<dyn Sleeper>,
    pub bus: Bus,
    pub params: PollerParams,
}

impl Poller {
    /// Runs the session to completion and returns its terminal state.
    pub(crate) async fn run(self) -> JobState {
        let token = self.session.token().clone();

        self.request(&token).await;
        if token.is_cancelled() {
            return self.cancelled();
        }

        self.session.transition(JobState::Polling);
        self.publish(EventKind::JobPolling);

        loop {
            if token.is_cancelled() {
                return self.cancelled();
            }

            let polled = self.client.progress(self.session.subject(), &token).await;
            if token.is_cancelled() {
                return self.cancelled();
            }

            match polled {
                Err(err) => {
                    tracing::warn!(
                        subject = %self.session.subject(),
                        error = %err,
                        label = err.as_label(),
                        "transient poll error"
                    );
                    self.bus.publish(
                        self.event(EventKind::PollTransientError)
                            .with_reason(err.to_string()),
                    );
                }
                Ok(progress) => {
                    self.session.record(progress.clone());
                    if let Some(state) = self.on_report(progress, &token).await {
                        return state;
                    }
                }
            }

            if !wait_or_cancel(self.sleeper.as_ref(), self.params.poll_interval, &token).await {
                return self.cancelled();
            }
        }
    }

    async fn request(&self, token: &CancellationToken) {
        match self.client.start(self.session.subject(), token).await {
            Ok(reply) if reply.is_success() => {
                tracing::debug!(
                    subject = %self.session.subject(),
                    status = reply.status,
                    "job start acknowledged"
                );
            }
            Ok(reply) => {
                tracing::warn!(
                    subject = %self.session.subject(),
                    status = reply.status,
                    "job start rejected; polling anyway"
                );
                self.bus
                    .publish(self.event(EventKind::JobStartFailed).with_status(reply.status));
            }
            Err(err) if err.is_canceled() => {}
            Err(err) => {
                tracing::warn!(
                    subject = %self.session.subject(),
                    error = %err,
                    "job start failed; polling anyway"
                );
                self.bus.publish(
                    self.event(EventKind::JobStartFailed)
                        .with_reason(err.to_string()),
                );
            }
        }
    }

    /// Handles one decoded report; `Some` ends the session.
    async fn on_report(
        &self,
        progress: JobProgress,
        token: &CancellationToken,
    ) -> Option<JobState> {
        match progress.status {
            JobStatus::Pending => {
                tracing::debug!(
                    subject = %self.session.subject(),
                    percent = progress.percent,
                    detail = %progress.message,
                    "job pending"
                );
                self.bus.publish(
                    self.event(EventKind::JobProgress)
                        .with_percent(progress.percent)
                        .with_reason(progress.message.as_str()),
                );
                self.callbacks
                    .on_progress(progress.percent, &progress.message);
                None
            }
            JobStatus::Completed => Some(self.complete(token).await),
            JobStatus::NotFound => {
                self.publish(EventKind::JobNotFound);
                match self.params.not_found {
                    NotFoundPolicy::Complete => Some(self.complete(token).await),
                    NotFoundPolicy::Fail => Some(self.fail(NOT_FOUND_MESSAGE)),
                }
            }
            JobStatus::Failed => Some(self.fail(progress.failure_message())),
        }
    }

    async fn complete(&self, token: &CancellationToken) -> JobState {
        let fetched = self.client.result(self.session.subject(), token).await;
        if token.is_cancelled() {
            return self.cancelled();
        }
        match fetched {
            Ok(result) => {
                tracing::debug!(
                    subject = %self.session.subject(),
                    bytes = result.as_bytes().len(),
                    "job completed"
                );
                self.callbacks.on_complete(result);
                self.publish(EventKind::JobCompleted);
                self.finish(JobState::Completed)
            }
            Err(err) => self.fail(&format!("result fetch failed: {err}")),
        }
    }

    fn fail(&self, message: &str) -> JobState {
        tracing::debug!(subject = %self.session.subject(), error = message, "job failed");
        self.callbacks.on_error(message);
        self.bus.publish(self.event(EventKind::JobFailed).with_reason(message));
        self.finish(JobState::Failed)
    }

    fn cancelled(&self) -> JobState {
        tracing::debug!(subject = %self.session.subject(), "poll session cancelled");
        self.publish(EventKind::JobCancelled);
        self.finish(JobState::Cancelled)
    }

    fn finish(&self, state: JobState) -> JobState {
        self.session.transition(state);
        state
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_subject(self.session.subject())
    }

    fn publish(&self, kind: EventKind) {
        self.bus.publish(self.event(kind));
    }
}
