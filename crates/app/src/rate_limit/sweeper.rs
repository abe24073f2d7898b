//! Background eviction of idle clients.

use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::rate_limit::{RateLimiter, SWEEP_INTERVAL};

/// Sweep `limiter` every [`SWEEP_INTERVAL`] until `cancel` fires.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval(SWEEP_INTERVAL);

        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        ticks.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticks.tick() => {
                    let evicted = limiter.sweep();

                    debug!(evicted, tracked = limiter.tracked_clients(), "rate limit sweep");
                }
            }
        }

        info!("rate limit sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;
    use tokio::time::advance;

    use crate::rate_limit::{ClientKey, RateLimiterSettings};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_clients_disappear_after_a_sweep() -> TestResult {
        let limiter = Arc::new(RateLimiter::new(RateLimiterSettings::default()));
        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&limiter), cancel.clone());

        assert_eq!(limiter.check(&ClientKey::new("198.51.100.7")), Ok(()));
        assert_eq!(limiter.tracked_clients(), 1);

        // Let the sweeper register its first tick before moving time.
        tokio::task::yield_now().await;

        advance(Duration::from_secs(181)).await;
        advance(SWEEP_INTERVAL).await;
        tokio::task::yield_now().await;

        assert_eq!(limiter.tracked_clients(), 0, "idle client swept");

        cancel.cancel();
        handle.await?;

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_stops_the_task() -> TestResult {
        let limiter = Arc::new(RateLimiter::new(RateLimiterSettings::default()));
        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(limiter, cancel.clone());

        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle).await??;

        Ok(())
    }
}
