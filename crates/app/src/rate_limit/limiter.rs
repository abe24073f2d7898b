//! Client registry.

use std::{fmt, net::IpAddr, time::Duration};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::rate_limit::TokenBucket;

/// How often idle clients are swept.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Clients unseen for longer than this are forgotten by the next sweep.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiterSettings {
    pub enabled: bool,
    /// Tokens credited per second.
    pub rate: f64,
    /// Bucket capacity, and the number of back-to-back requests a new client gets.
    pub burst: u32,
}

impl Default for RateLimiterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 2.0,
            burst: 4,
        }
    }
}

/// Stable per-client key derived from the originating network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(String);

impl ClientKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for ClientKey {
    fn from(address: IpAddr) -> Self {
        Self(address.to_canonical().to_string())
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded")]
pub struct RateLimited;

#[derive(Debug)]
struct ClientBucket {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Shared registry of client buckets behind a single lock.
///
/// The lock covers lookup-or-create, refill-and-consume and the `last_seen` update
/// for one request, and the eviction pass of a sweep. It is never held across an
/// await point.
#[derive(Debug)]
pub struct RateLimiter {
    settings: RateLimiterSettings,
    clients: Mutex<FxHashMap<ClientKey, ClientBucket>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(settings: RateLimiterSettings) -> Self {
        Self {
            settings,
            clients: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> RateLimiterSettings {
        self.settings
    }

    /// Admit or refuse one request from `key` now.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when the client has no whole token left.
    pub fn check(&self, key: &ClientKey) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now())
    }

    /// Admit or refuse one request from `key` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when the client has no whole token left.
    pub fn check_at(&self, key: &ClientKey, now: Instant) -> Result<(), RateLimited> {
        if !self.settings.enabled {
            return Ok(());
        }

        let mut clients = self.clients.lock();

        let client = clients.entry(key.clone()).or_insert_with(|| ClientBucket {
            bucket: TokenBucket::full(f64::from(self.settings.burst), self.settings.rate, now),
            last_seen: now,
        });

        client.last_seen = now;

        if client.bucket.try_take(now) {
            Ok(())
        } else {
            Err(RateLimited)
        }
    }

    /// Forget clients idle for longer than [`IDLE_THRESHOLD`], returning how many went.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock();
        let before = clients.len();

        clients.retain(|_, client| now.saturating_duration_since(client.last_seen) <= IDLE_THRESHOLD);

        let evicted = before - clients.len();

        if evicted > 0 {
            debug!(evicted, remaining = clients.len(), "swept idle rate limit clients");
        }

        evicted
    }

    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::{net::Ipv4Addr, sync::Arc};

    use testresult::TestResult;

    use super::*;

    fn limiter(rate: f64, burst: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterSettings {
            enabled: true,
            rate,
            burst,
        })
    }

    fn key(n: u8) -> ClientKey {
        ClientKey::from(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)))
    }

    #[test]
    fn new_client_gets_exactly_burst_requests() {
        let limiter = limiter(2.0, 4);
        let now = Instant::now();

        for n in 1..=4 {
            assert_eq!(limiter.check_at(&key(1), now), Ok(()), "request {n} admitted");
        }

        assert_eq!(limiter.check_at(&key(1), now), Err(RateLimited));
        assert_eq!(limiter.check_at(&key(2), now), Ok(()), "other clients unaffected");
    }

    #[test]
    fn client_regains_rate_times_elapsed_up_to_burst() {
        let limiter = limiter(2.0, 4);
        let start = Instant::now();

        while limiter.check_at(&key(1), start).is_ok() {}

        let later = start + Duration::from_millis(1500);
        let admitted = (0..10)
            .filter(|_| limiter.check_at(&key(1), later).is_ok())
            .count();

        assert_eq!(admitted, 3, "1.5 s at 2/s is 3 tokens");

        let much_later = later + Duration::from_secs(3600);
        let admitted = (0..10)
            .filter(|_| limiter.check_at(&key(1), much_later).is_ok())
            .count();

        assert_eq!(admitted, 4, "refill stops at burst");
    }

    #[test]
    fn sweep_evicts_idle_clients_only() {
        let limiter = limiter(2.0, 4);
        let start = Instant::now();

        assert_eq!(limiter.check_at(&key(1), start), Ok(()));
        assert_eq!(
            limiter.check_at(&key(2), start + Duration::from_secs(179)),
            Ok(())
        );

        let evicted = limiter.sweep_at(start + Duration::from_secs(181));

        assert_eq!(evicted, 1);
        assert_eq!(limiter.tracked_clients(), 1);

        // Evicted clients come back with a full bucket.
        let again = start + Duration::from_secs(181);

        for _ in 0..4 {
            assert_eq!(limiter.check_at(&key(1), again), Ok(()), "fresh bucket");
        }
    }

    #[test]
    fn refused_requests_still_count_as_activity() {
        let limiter = limiter(0.0, 1);
        let start = Instant::now();

        assert_eq!(limiter.check_at(&key(1), start), Ok(()));
        assert_eq!(
            limiter.check_at(&key(1), start + Duration::from_secs(170)),
            Err(RateLimited)
        );
        assert_eq!(limiter.sweep_at(start + Duration::from_secs(200)), 0, "seen at 170 s");
    }

    #[test]
    fn disabled_limiter_admits_everything_without_tracking() {
        let limiter = RateLimiter::new(RateLimiterSettings {
            enabled: false,
            ..RateLimiterSettings::default()
        });
        let now = Instant::now();

        for _ in 0..100 {
            assert_eq!(limiter.check_at(&key(1), now), Ok(()), "always admitted");
        }

        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn ipv4_mapped_addresses_share_a_key() {
        let mapped: IpAddr = Ipv4Addr::new(192, 0, 2, 1).to_ipv6_mapped().into();

        assert_eq!(
            ClientKey::from(mapped),
            ClientKey::from(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_share_one_bucket() -> TestResult {
        let limiter = Arc::new(limiter(0.0, 4));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = Arc::clone(&limiter);

                tokio::spawn(async move { limiter.check(&key(9)).is_ok() })
            })
            .collect();

        let mut admitted = 0;

        for handle in handles {
            if handle.await? {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 4, "one bucket, created once");
        assert_eq!(limiter.tracked_clients(), 1);

        Ok(())
    }
}
