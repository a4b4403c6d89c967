//! # JobOrchestrator: at most one poll session at a time.
//!
//! The orchestrator owns a single session **slot**. [`JobOrchestrator::start`] decides
//! what to do with a new request from the slot's content:
//!
//! | slot                           | `start(subject)`                                      |
//! |--------------------------------|-------------------------------------------------------|
//! | empty / ended / cancelled      | new session, spawn the poll task → `Ok(handle)`       |
//! | active, same subject           | join: `Ok(existing handle)`, zero network calls       |
//! | active, different subject      | reject: `Err(StartError::Busy)`, nothing changes      |
//!
//! The poll task clears the slot when it exits (including on a panicking callback),
//! but only if the slot still holds *its* session.
//!
//! ## Wiring
//! ```text
//! OrchestratorBuilder::build()
//!   ├─► Bus::new(cfg.bus_capacity_clamped())
//!   ├─► RetryingTransport::new(cfg.retry).with_sleeper(..).with_bus(..)
//!   ├─► JobClient::new(exchange, transport)
//!   └─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! start(subject, callbacks)
//!   └─► slot ← PollSession ─► tokio::spawn(Poller::run) ─► SlotRelease on exit
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use jobvisor::{HttpExchange, JobOrchestrator, JobResult, OrchestratorConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let exchange = Arc::new(HttpExchange::new("https://api.example.com/v1/")?);
//! let orchestrator = JobOrchestrator::new(OrchestratorConfig::default(), exchange);
//!
//! let handle = orchestrator.start_with(
//!     "doc-42",
//!     |percent: u8, message: &str| println!("{percent}% {message}"),
//!     |result: JobResult| println!("{} bytes", result.as_bytes().len()),
//!     |error: &str| eprintln!("failed: {error}"),
//! )?;
//! let state = handle.wait().await;
//! println!("finished: {state:?}");
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::OrchestratorConfig;
use crate::error::StartError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::callbacks::{CallbackFns, JobCallbacks};
use crate::jobs::client::JobClient;
use crate::jobs::poller::{Poller, PollerParams};
use crate::jobs::progress::JobResult;
use crate::jobs::session::{JobHandle, JobState, PollSession};
use crate::jobs::subject::JobSubject;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::transport::{Exchange, RetryingTransport, Sleeper, TokioSleeper};

type Slot = Arc<Mutex<Option<Arc<PollSession>>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Arc<PollSession>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for [`JobOrchestrator`] with optional collaborators.
pub struct OrchestratorBuilder {
    cfg: OrchestratorConfig,
    exchange: Arc<dyn Exchange>,
    sleeper: Arc<dyn Sleeper>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    /// Creates a builder for the given configuration and exchange.
    pub fn new(cfg: OrchestratorConfig, exchange: Arc<dyn Exchange>) -> Self {
        Self {
            cfg,
            exchange,
            sleeper: Arc::new(TokioSleeper),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the sleeper used for retry backoff **and** the poll interval.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive transport and job lifecycle events through dedicated
    /// workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the orchestrator.
    ///
    /// Must be called inside a tokio runtime when subscribers are configured.
    pub fn build(self) -> JobOrchestrator {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let transport = RetryingTransport::new(self.cfg.retry)
            .with_sleeper(Arc::clone(&self.sleeper))
            .with_bus(bus.clone());
        let client = JobClient::new(self.exchange, transport);

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
            Some(subscriber_listener(&bus, subs))
        };

        JobOrchestrator {
            params: PollerParams {
                poll_interval: self.cfg.poll_interval_clamped(),
                not_found: self.cfg.not_found,
            },
            cfg: self.cfg,
            client,
            sleeper: self.sleeper,
            bus,
            slot: Arc::new(Mutex::new(None)),
            listener,
        }
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Drives server-side jobs, one subject at a time.
pub struct JobOrchestrator {
    cfg: OrchestratorConfig,
    params: PollerParams,
    client: JobClient,
    sleeper: Arc<dyn Sleeper>,
    bus: Bus,
    slot: Slot,
    listener: Option<JoinHandle<()>>,
}

impl JobOrchestrator {
    /// Returns a builder for full control over collaborators.
    pub fn builder(cfg: OrchestratorConfig, exchange: Arc<dyn Exchange>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg, exchange)
    }

    /// Creates an orchestrator with the tokio timer and no subscribers.
    pub fn new(cfg: OrchestratorConfig, exchange: Arc<dyn Exchange>) -> Self {
        Self::builder(cfg, exchange).build()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }

    /// Returns the event bus (subscribe to observe transport and job events).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Starts polling `subject`, or joins the active session for the same subject.
    ///
    /// Must be called inside a tokio runtime: the poll loop runs as a spawned task.
    ///
    /// # Errors
    /// [`StartError::Busy`] when a session for a different subject is still active.
    pub fn start(
        &self,
        subject: impl Into<JobSubject>,
        callbacks: Arc<dyn JobCallbacks>,
    ) -> Result<JobHandle, StartError> {
        let subject = subject.into();
        let mut slot = lock(&self.slot);

        if let Some(active) = slot.as_ref().filter(|s| s.is_active()) {
            if active.subject() == &subject {
                tracing::debug!(%subject, session = active.id(), "joined active poll session");
                self.bus
                    .publish(Event::new(EventKind::StartJoined).with_subject(&subject));
                return Ok(JobHandle::new(Arc::clone(active)));
            }
            tracing::debug!(
                %subject,
                active = %active.subject(),
                "start rejected: orchestrator busy"
            );
            self.bus.publish(
                Event::new(EventKind::StartRejected)
                    .with_subject(&subject)
                    .with_reason(active.subject()),
            );
            return Err(StartError::Busy {
                active: active.subject().clone(),
            });
        }

        let session = Arc::new(PollSession::new(subject.clone()));
        *slot = Some(Arc::clone(&session));
        drop(slot);

        tracing::debug!(%subject, session = session.id(), "job requested");
        self.bus
            .publish(Event::new(EventKind::JobRequested).with_subject(&subject));

        let poller = Poller {
            client: self.client.clone(),
            session: Arc::clone(&session),
            callbacks,
            sleeper: Arc::clone(&self.sleeper),
            bus: self.bus.clone(),
            params: self.params,
        };
        let release = SlotRelease {
            slot: Arc::clone(&self.slot),
            session: Arc::clone(&session),
        };
        tokio::spawn(async move {
            let _release = release;
            poller.run().await
        });

        Ok(JobHandle::new(session))
    }

    /// [`start`](Self::start) with closure callbacks.
    pub fn start_with<P, C, E>(
        &self,
        subject: impl Into<JobSubject>,
        on_progress: P,
        on_complete: C,
        on_error: E,
    ) -> Result<JobHandle, StartError>
    where
        P: Fn(u8, &str) + Send + Sync + 'static,
        C: Fn(JobResult) + Send + Sync + 'static,
        E: Fn(&str) + Send + Sync + 'static,
    {
        self.start(subject, CallbackFns::arc(on_progress, on_complete, on_error))
    }

    /// Cancels the session behind `handle` (see [`JobHandle::cancel`]).
    pub fn cancel(&self, handle: &JobHandle) {
        handle.cancel();
    }

    /// Cancels whatever session is active, if any. Returns `true` if one was.
    pub fn cancel_active(&self) -> bool {
        match self.active() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Handle to the active session, if any.
    pub fn active(&self) -> Option<JobHandle> {
        lock(&self.slot)
            .as_ref()
            .filter(|s| s.is_active())
            .map(|s| JobHandle::new(Arc::clone(s)))
    }

    /// State of the active session, or [`JobState::Idle`].
    pub fn state(&self) -> JobState {
        lock(&self.slot)
            .as_ref()
            .filter(|s| s.is_active())
            .map_or(JobState::Idle, |s| s.state())
    }

    /// Cancels the session in the slot and waits for its poll task to stop.
    ///
    /// Also waits for a session that was already cancelled but is still finishing an
    /// in-flight call.
    pub async fn shutdown(&self) {
        let current = lock(&self.slot).clone();
        if let Some(session) = current {
            session.token().cancel();
            session.wait().await;
        }
    }
}

impl Drop for JobOrchestrator {
    /// Cancels the session in the slot so its poll task stops with the orchestrator.
    fn drop(&mut self) {
        if let Some(session) = lock(&self.slot).as_ref() {
            session.token().cancel();
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Clears the slot when a poll task exits, however it exits.
struct SlotRelease {
    slot: Slot,
    session: Arc<PollSession>,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        if !self.session.state().is_terminal() {
            tracing::error!(
                subject = %self.session.subject(),
                "poll task ended without a terminal state"
            );
            self.session.transition(JobState::Failed);
        }
        let mut slot = lock(&self.slot);
        if slot.as_ref().is_some_and(|s| s.id() == self.session.id()) {
            *slot = None;
        }
    }
}
