//! Hybrid rate limiting for upstream APIs.
//!
//! Combines throughput limiting (token bucket) with concurrency limiting
//! (semaphore). Each upstream endpoint gets its own [`RateLimiter`] instance;
//! the standard set of tunings lives in [`ApiLimiters`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

// ==============================================================================
// Rate Limiter
// ==============================================================================

/// Token-bucket rate limiter with an independent in-flight concurrency cap.
///
/// [`acquire`](Self::acquire) first waits for a rate token, then takes a
/// concurrency slot, so a task waiting out the bucket never holds a slot.
/// Tokens refill continuously at `tokens_per_second` up to `burst`; when
/// fewer than one token is available the acquirer sleeps `(1 - tokens) / rate`
/// and proceeds with the bucket drained to zero. Token waiters queue on the
/// bucket lock, so at most one task sleeps out a deficit at a time.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    bucket: Mutex<TokenBucket>,
    rate: f64,
    burst: f64,
}

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Scoped concurrency slot returned by [`RateLimiter::acquire`]. The slot is
/// returned to the limiter when the permit is dropped.
pub struct RatePermit {
    _slot: OwnedSemaphorePermit,
}

impl RateLimiter {
    pub fn new(tokens_per_second: f64, max_concurrent: usize, burst: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            bucket: Mutex::new(TokenBucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
            rate: tokens_per_second,
            burst: f64::from(burst),
        }
    }

    /// Wait until both a rate token and a concurrency slot are available.
    pub async fn acquire(&self) -> RatePermit {
        self.take_token().await;
        let slot = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");
        RatePermit { _slot: slot }
    }

    async fn take_token(&self) {
        let mut bucket = self.bucket.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens < 1.0 {
            let wait = (1.0 - bucket.tokens) / self.rate;
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;
            bucket.tokens = 0.0;
        } else {
            bucket.tokens -= 1.0;
        }
    }
}

// ==============================================================================
// Preconfigured Instances
// ==============================================================================

/// The rate limiters for every upstream this crate talks to, one instance per
/// endpoint. Constructed once and passed by reference; there is no global
/// limiter state.
///
/// The cluster oracle's 0.8 req/s is the binding constraint on large graphs:
/// 200 lookups take roughly four minutes, which is why the attribution pass
/// caps Tier 2 by default.
pub struct ApiLimiters {
    pub primary: Arc<RateLimiter>,
    pub fallback: Arc<RateLimiter>,
    pub cluster: Arc<RateLimiter>,
    pub premium: Arc<RateLimiter>,
}

impl Default for ApiLimiters {
    fn default() -> Self {
        Self {
            primary: Arc::new(RateLimiter::new(8.0, 5, 10)),
            fallback: Arc::new(RateLimiter::new(8.0, 5, 10)),
            cluster: Arc::new(RateLimiter::new(0.8, 1, 2)),
            premium: Arc::new(RateLimiter::new(5.0, 3, 5)),
        }
    }
}
