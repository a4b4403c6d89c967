//! # Poll sessions and their handles.
//!
//! A [`PollSession`] is the shared state of one `start()`: the subject, the cancellation
//! token, the lifecycle state and the most recent progress report. The poll task writes
//! it; callers observe it through a cloneable [`JobHandle`].
//!
//! ## Lifecycle
//! ```text
//! (Idle) ──start()──► Requested ──► Polling ──► Completed
//!                         │            │    └─► Failed
//!                         └────────────┴──────► Cancelled
//! ```
//! A session stops being *active* as soon as it reaches a terminal state **or** its
//! token is cancelled, whichever happens first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::jobs::progress::JobProgress;
use crate::jobs::subject::JobSubject;

static SESSION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a poll session (or of an orchestrator with none, [`JobState::Idle`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobState {
    /// No session.
    Idle,
    /// The start call is being issued.
    Requested,
    /// The poll loop is running.
    Polling,
    /// `on_complete` was delivered.
    Completed,
    /// `on_error` was delivered.
    Failed,
    /// The session was cancelled before reaching a job outcome.
    Cancelled,
}

impl JobState {
    /// True for `Completed`, `Failed` and `Cancelled`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Requested => "requested",
            JobState::Polling => "polling",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

/// Shared state of one poll session.
pub(crate) struct PollSession {
    id: u64,
    subject: JobSubject,
    token: CancellationToken,
    state: watch::Sender<JobState>,
    progress: Mutex<Option<JobProgress>>,
}

impl PollSession {
    /// Creates a session in [`JobState::Requested`] with a fresh token.
    pub(crate) fn new(subject: JobSubject) -> Self {
        let (state, _) = watch::channel(JobState::Requested);
        Self {
            id: SESSION_SEQ.fetch_add(1, Ordering::Relaxed),
            subject,
            token: CancellationToken::new(),
            state,
            progress: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn subject(&self) -> &JobSubject {
        &self.subject
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Moves to `next` unless the session already ended.
    pub(crate) fn transition(&self, next: JobState) {
        self.state.send_if_modified(|current| {
            if current.is_terminal() || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    pub(crate) fn record(&self, progress: JobProgress) {
        *self.progress.lock().unwrap_or_else(PoisonError::into_inner) = Some(progress);
    }

    pub(crate) fn latest_progress(&self) -> Option<JobProgress> {
        self.progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.state().is_terminal() && !self.token.is_cancelled()
    }

    pub(crate) async fn wait(&self) -> JobState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(JobState::is_terminal).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }
}

/// Caller-side handle to a poll session.
///
/// Cheap to clone. Two handles compare equal iff they refer to the same session, so a
/// joined `start()` returns a handle equal to the original one.
#[derive(Clone)]
pub struct JobHandle {
    session: Arc<PollSession>,
}

impl JobHandle {
    pub(crate) fn new(session: Arc<PollSession>) -> Self {
        Self { session }
    }

    /// Process-unique session id.
    pub fn id(&self) -> u64 {
        self.session.id()
    }

    /// Subject being polled.
    pub fn subject(&self) -> &JobSubject {
        self.session.subject()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.session.state()
    }

    /// Most recent progress report, if any was received.
    pub fn latest_progress(&self) -> Option<JobProgress> {
        self.session.latest_progress()
    }

    /// True until the session ends or is cancelled.
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Requests cancellation.
    ///
    /// The poll task stops at its next check point: no further network call is issued
    /// and no further callback is delivered. An in-flight call is allowed to finish but
    /// its reply is discarded. Idempotent.
    pub fn cancel(&self) {
        self.session.token().cancel();
    }

    /// True once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.session.token().is_cancelled()
    }

    /// Waits until the session reaches a terminal state and returns it.
    pub async fn wait(&self) -> JobState {
        self.session.wait().await
    }
}

impl PartialEq for JobHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

impl Eq for JobHandle {}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id())
            .field("subject", self.subject())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_state_is_sticky() {
        let s = PollSession::new("doc".into());
        assert_eq!(s.state(), JobState::Requested);
        s.transition(JobState::Polling);
        s.transition(JobState::Failed);
        s.transition(JobState::Completed);
        assert_eq!(s.state(), JobState::Failed);
    }

    #[test]
    fn cancel_makes_session_inactive() {
        let handle = JobHandle::new(Arc::new(PollSession::new("doc".into())));
        assert!(handle.is_active());
        handle.cancel();
        assert!(!handle.is_active());
        assert_eq!(handle.state(), JobState::Requested);
    }

    #[test]
    fn handles_compare_by_session() {
        let session = Arc::new(PollSession::new("doc".into()));
        let a = JobHandle::new(Arc::clone(&session));
        let b = JobHandle::new(session);
        let c = JobHandle::new(Arc::new(PollSession::new("doc".into())));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.id(), c.id());
    }

    #[tokio::test]
    async fn wait_returns_terminal_state() {
        let session = Arc::new(PollSession::new("doc".into()));
        let handle = JobHandle::new(Arc::clone(&session));
        let waiter = tokio::spawn(async move { handle.wait().await });
        session.transition(JobState::Polling);
        session.transition(JobState::Completed);
        assert_eq!(waiter.await.unwrap(), JobState::Completed);
    }
}
