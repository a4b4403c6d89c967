//! # Injectable waiting.
//!
//! Every wait in the crate (retry backoff and the poll interval) goes through a
//! [`Sleeper`], so tests can substitute an instant, recording implementation.
//! [`TokioSleeper`] is the production default.
//!
//! Waits are always raced against a [`CancellationToken`]; see [`wait_or_cancel`].

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Asynchronous delay source.
#[async_trait]
pub trait Sleeper: Send + Sync + 'static {
    /// Suspends the calling task for `delay`.
    async fn sleep(&self, delay: Duration);
}

/// [`Sleeper`] backed by [`tokio::time::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Waits `delay` unless `token` is cancelled first.
///
/// Returns `true` if the full delay elapsed, `false` on cancellation. A token that is
/// already cancelled wins even against a zero-length sleep.
pub async fn wait_or_cancel(
    sleeper: &dyn Sleeper,
    delay: Duration,
    token: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = sleeper.sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_elapses() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        assert!(wait_or_cancel(&TokioSleeper, Duration::from_secs(2), &token).await);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_interrupts_wait() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        assert!(!wait_or_cancel(&TokioSleeper, Duration::from_secs(60), &token).await);
    }

    #[tokio::test]
    async fn pre_cancelled_token_wins_over_zero_delay() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(!wait_or_cancel(&TokioSleeper, Duration::ZERO, &token).await);
    }
}
