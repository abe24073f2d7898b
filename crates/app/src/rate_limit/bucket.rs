//! Token bucket

use tokio::time::Instant;

/// Continuous-refill token bucket. Time is always passed in, never read.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBucket {
    capacity: f64,
    rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A bucket holding `capacity` tokens at `now`.
    #[must_use]
    pub fn full(capacity: f64, rate: f64, now: Instant) -> Self {
        Self {
            capacity,
            rate,
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Credit tokens for the time since the last refill, capped at capacity.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();

        self.tokens = self.capacity.min(self.tokens + elapsed * self.rate);
        self.last_refill = now;
    }

    /// Refill, then take one token if a whole one is available.
    pub fn try_take(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;

            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn tokens(&self) -> f64 {
        self.tokens
    }
}
