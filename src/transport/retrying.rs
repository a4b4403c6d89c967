//! # RetryingTransport: one logical request, many attempts.
//!
//! Wraps any "perform one attempt" closure and retries it on transient failure with
//! exponential backoff and jitter taken from [`RetryConfig`].
//!
//! ## Attempt flow
//! ```text
//! a = 0
//! loop {
//!   ├─► token cancelled?            → Err(Canceled)      (no further attempts)
//!   ├─► attempt()
//!   │     ├─ Ok(reply), terminal    → Ok(reply)
//!   │     ├─ Ok(reply), retryable   → a == max? Ok(reply) : reply.release()
//!   │     ├─ Err(Io)                → a == max? Err(Io)   : continue below
//!   │     └─ Err(other)             → Err(other)
//!   ├─► delay = cfg.delay_for_attempt(a)
//!   ├─► publish RetryScheduled
//!   ├─► wait(delay) (cancellable)   → cancelled? Err(Canceled)
//!   └─► a += 1
//! }
//! ```
//!
//! ## Rules
//! - At most `max_retries + 1` attempts per `execute` call.
//! - A retryable reply is released **before** the backoff wait.
//! - Exhausted retries surface the **last** failure (reply or I/O error), never a
//!   synthetic one.
//! - Cancellation during a wait is reported as [`TransportError::Canceled`].

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::{RetryClass, RetryConfig};
use crate::transport::response::Response;
use crate::transport::sleeper::{Sleeper, TokioSleeper, wait_or_cancel};

/// Result of [`RetryingTransport::execute`].
///
/// `Ok` holds the terminal reply: a success, a non-retryable error status, or the last
/// retryable status once the budget is spent. `Err` holds a non-retryable transport
/// error, the last I/O error after exhaustion, or [`TransportError::Canceled`].
pub type RetryOutcome<R> = Result<R, TransportError>;

/// What made an attempt retryable.
enum Failure {
    Status(u16),
    Io(TransportError),
}

/// Retry wrapper around single-attempt request closures.
///
/// Cheap to clone; clones share the sleeper and bus.
#[derive(Clone)]
pub struct RetryingTransport {
    cfg: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    bus: Option<Bus>,
}

impl RetryingTransport {
    /// Creates a transport sleeping on the tokio timer.
    pub fn new(cfg: RetryConfig) -> Self {
        Self {
            cfg,
            sleeper: Arc::new(TokioSleeper),
            bus: None,
        }
    }

    /// Replaces the sleeper used for backoff waits.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Publishes retry events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.cfg
    }

    /// Executes one logical request.
    ///
    /// `attempt` must perform exactly one round trip per call. The backoff waits run on
    /// the calling task and are interrupted by `token`.
    pub async fn execute<R, F, Fut>(
        &self,
        token: &CancellationToken,
        mut attempt: F,
    ) -> RetryOutcome<R>
    where
        R: Response,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, TransportError>>,
    {
        let mut index: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(TransportError::Canceled);
            }

            let failure = match attempt().await {
                Ok(reply) => {
                    let status = reply.status();
                    if !RetryClass::of_status(status).is_retryable() {
                        return Ok(reply);
                    }
                    if index >= self.cfg.max_retries {
                        tracing::warn!(attempt = index, status, "retries exhausted");
                        self.publish(
                            Event::new(EventKind::RetriesExhausted)
                                .with_attempt(index)
                                .with_status(status),
                        );
                        return Ok(reply);
                    }
                    reply.release();
                    Failure::Status(status)
                }
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    if index >= self.cfg.max_retries {
                        tracing::warn!(attempt = index, error = %err, "retries exhausted");
                        self.publish(
                            Event::new(EventKind::RetriesExhausted)
                                .with_attempt(index)
                                .with_reason(err.to_string()),
                        );
                        return Err(err);
                    }
                    Failure::Io(err)
                }
            };

            let delay = self.cfg.delay_for_attempt(index);
            let scheduled = Event::new(EventKind::RetryScheduled)
                .with_attempt(index)
                .with_delay(delay);
            let scheduled = match &failure {
                Failure::Status(status) => {
                    tracing::debug!(attempt = index, status, ?delay, "retrying after status");
                    scheduled.with_status(*status)
                }
                Failure::Io(err) => {
                    tracing::debug!(
                        attempt = index,
                        error = %err,
                        ?delay,
                        "retrying after i/o failure"
                    );
                    scheduled.with_reason(err.to_string())
                }
            };
            self.publish(scheduled);

            if !wait_or_cancel(self.sleeper.as_ref(), delay, token).await {
                self.publish(Event::new(EventKind::RetryCanceled).with_attempt(index));
                return Err(TransportError::Canceled);
            }
            index += 1;
        }
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Sleeper that returns immediately and records every requested delay.
    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    /// Sleeper that cancels a token the first time it is asked to wait, then hangs.
    struct CancellingSleeper(CancellationToken);

    #[async_trait]
    impl Sleeper for CancellingSleeper {
        async fn sleep(&self, _delay: Duration) {
            self.0.cancel();
            std::future::pending::<()>().await;
        }
    }

    struct FakeReply {
        status: u16,
        released: Arc<AtomicUsize>,
    }

    impl Response for FakeReply {
        fn status(&self) -> u16 {
            self.status
        }

        fn release(self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Scripted attempt source: statuses or I/O failures, in order.
    struct Script {
        steps: Mutex<VecDeque<Result<u16, TransportError>>>,
        calls: AtomicUsize,
        released: Arc<AtomicUsize>,
    }

    impl Script {
        fn new(steps: Vec<Result<u16, TransportError>>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
                released: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn statuses(statuses: &[u16]) -> Self {
            Self::new(statuses.iter().copied().map(Ok).collect())
        }

        async fn attempt(&self) -> Result<FakeReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted");
            step.map(|status| FakeReply {
                status,
                released: Arc::clone(&self.released),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn transport(sleeper: Arc<RecordingSleeper>) -> RetryingTransport {
        RetryingTransport::new(RetryConfig::default()).with_sleeper(sleeper)
    }

    fn ms(d: Duration) -> u128 {
        d.as_millis()
    }

    #[tokio::test]
    async fn three_503_then_200_returns_success_with_bounded_delays() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::statuses(&[503, 503, 503, 200]);
        let token = CancellationToken::new();

        let out = transport(sleeper.clone())
            .execute(&token, || script.attempt())
            .await
            .unwrap();

        assert_eq!(out.status, 200);
        assert_eq!(script.calls(), 4);
        assert_eq!(script.released.load(Ordering::SeqCst), 3);

        let delays = sleeper.delays.lock().unwrap().clone();
        assert_eq!(delays.len(), 3);
        let windows: [(u128, u128); 3] = [(700, 1300), (1400, 2600), (2800, 5200)];
        for (d, (lo, hi)) in delays.iter().zip(windows) {
            assert!((lo..=hi).contains(&ms(*d)), "{d:?} outside [{lo}, {hi}]");
        }
    }

    #[tokio::test]
    async fn k_retryable_failures_take_k_plus_one_attempts() {
        for k in 0..3usize {
            let sleeper = Arc::new(RecordingSleeper::default());
            let mut statuses = vec![502; k];
            statuses.push(201);
            let script = Script::statuses(&statuses);

            let out = transport(sleeper.clone())
                .execute(&CancellationToken::new(), || script.attempt())
                .await
                .unwrap();

            assert_eq!(out.status, 201);
            assert_eq!(script.calls(), k + 1);
            assert_eq!(sleeper.delays.lock().unwrap().len(), k);
        }
    }

    #[tokio::test]
    async fn non_retryable_status_returns_immediately_without_sleep() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::statuses(&[404]);

        let out = transport(sleeper.clone())
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .unwrap();

        assert_eq!(out.status, 404);
        assert_eq!(script.calls(), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
        assert_eq!(script.released.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_failure() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::statuses(&[500, 502, 503, 429]);

        let out = transport(sleeper.clone())
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .unwrap();

        assert_eq!(out.status, 429);
        assert_eq!(script.calls(), 4);
        // The last reply is handed back, not released.
        assert_eq!(script.released.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn io_failures_are_retried_then_surfaced() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::new(vec![
            Err(TransportError::io("reset 1")),
            Err(TransportError::io("reset 2")),
            Err(TransportError::io("reset 3")),
            Err(TransportError::io("reset 4")),
        ]);

        let err = transport(sleeper.clone())
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .err()
            .unwrap();

        assert_eq!(err, TransportError::io("reset 4"));
        assert_eq!(script.calls(), 4);
        assert_eq!(sleeper.delays.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn io_failure_then_success() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::new(vec![Err(TransportError::io("timed out")), Ok(200)]);

        let out = transport(sleeper)
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .unwrap();
        assert_eq!(out.status, 200);
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn request_errors_are_not_retried() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let script = Script::new(vec![Err(TransportError::request("bad header"))]);

        let err = transport(sleeper.clone())
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Request { .. }));
        assert_eq!(script.calls(), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let script = Script::statuses(&[503]);
        let out = RetryingTransport::new(RetryConfig::no_retry())
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .unwrap();
        assert_eq!(out.status, 503);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn cancellation_during_backoff_is_distinct() {
        let token = CancellationToken::new();
        let script = Script::statuses(&[503, 200]);
        let transport = RetryingTransport::new(RetryConfig::default())
            .with_sleeper(Arc::new(CancellingSleeper(token.clone())));

        let err = transport
            .execute(&token, || script.attempt())
            .await
            .err()
            .unwrap();

        assert_eq!(err, TransportError::Canceled);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_makes_no_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let script = Script::statuses(&[200]);

        let err = transport(Arc::new(RecordingSleeper::default()))
            .execute(&token, || script.attempt())
            .await
            .err()
            .unwrap();
        assert!(err.is_canceled());
        assert_eq!(script.calls(), 0);
    }

    #[tokio::test]
    async fn retry_events_are_published() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let script = Script::statuses(&[503, 503]);

        let out = RetryingTransport::new(RetryConfig::with_retries(1))
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .with_bus(bus)
            .execute(&CancellationToken::new(), || script.attempt())
            .await
            .unwrap();
        assert_eq!(out.status, 503);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::RetryScheduled);
        assert_eq!(first.status, Some(503));
        assert_eq!(first.attempt, Some(0));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, EventKind::RetriesExhausted);
        assert_eq!(second.attempt, Some(1));
    }
}
