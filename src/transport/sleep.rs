//! Injectable sleep used for retry backoff and task polling.
//!
//! Production code sleeps on the tokio timer; tests substitute a recorder so
//! the backoff schedule can be asserted without real waits.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current task for a duration.
#[async_trait]
pub trait Sleeper: Debug + Send + Sync {
    /// Waits for `duration` before returning.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_virtual_clock() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(900)).await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}
