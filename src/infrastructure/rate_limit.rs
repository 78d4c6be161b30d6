//! Per-client token buckets guarding the send endpoint.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    /// Tokens per second.
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: u32, per: Duration) -> Self {
        let capacity = f64::from(capacity);
        Self {
            tokens: capacity,
            capacity,
            refill_rate: capacity / per.as_secs_f64(),
            last_refill: Instant::now(),
        }
    }

    fn is_full(&self) -> bool {
        self.tokens >= self.capacity
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    fn try_consume(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(missing / self.refill_rate))
        }
    }
}

#[derive(Debug)]
struct Buckets {
    by_client: HashMap<IpAddr, TokenBucket>,
    last_sweep: Instant,
}

impl Buckets {
    /// A bucket that has refilled completely behaves exactly like a new one,
    /// so it can be dropped.
    fn sweep(&mut self, now: Instant) {
        let before = self.by_client.len();
        self.by_client.retain(|_, bucket| {
            bucket.refill(now);
            !bucket.is_full()
        });
        self.last_sweep = now;

        let evicted = before - self.by_client.len();
        if evicted > 0 {
            debug!(evicted, tracked = self.by_client.len(), "Evicted idle rate limit buckets");
        }
    }
}

pub struct ClientRateLimiter {
    limit: u32,
    window: Duration,
    buckets: Mutex<Buckets>,
}

impl ClientRateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// `limit` of zero disables limiting.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            buckets: Mutex::new(Buckets {
                by_client: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// `Err` carries how long the client should wait.
    pub async fn check(&self, client: IpAddr) -> Result<(), Duration> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        if now.duration_since(buckets.last_sweep) >= self.window {
            buckets.sweep(now);
        }
        let result = buckets
            .by_client
            .entry(client)
            .or_insert_with(|| TokenBucket::full(self.limit, self.window))
            .try_consume(now);

        if let Err(wait) = &result {
            debug!(%client, wait_seconds = wait.as_secs_f64(), "Rate limit exceeded");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const ALICE: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const BOB: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[tokio::test]
    async fn allows_burst_then_limits() {
        let limiter = ClientRateLimiter::per_minute(5);

        for _ in 0..5 {
            assert!(limiter.check(ALICE).await.is_ok());
        }
        let wait = limiter.check(ALICE).await.unwrap_err();
        assert!(wait > Duration::ZERO);
    }

    #[tokio::test]
    async fn clients_have_separate_buckets() {
        let limiter = ClientRateLimiter::per_minute(1);

        assert!(limiter.check(ALICE).await.is_ok());
        assert!(limiter.check(ALICE).await.is_err());
        assert!(limiter.check(BOB).await.is_ok());
    }

    #[tokio::test]
    async fn zero_disables_limiting() {
        let limiter = ClientRateLimiter::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.check(ALICE).await.is_ok());
        }
    }

    #[tokio::test]
    async fn idle_client_bucket_is_evicted() {
        let limiter = ClientRateLimiter::new(1, Duration::from_millis(50));

        assert!(limiter.check(ALICE).await.is_ok());
        assert!(limiter.buckets.lock().await.by_client.contains_key(&ALICE));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(limiter.check(BOB).await.is_ok());

        let buckets = limiter.buckets.lock().await;
        assert!(!buckets.by_client.contains_key(&ALICE));
        assert!(buckets.by_client.contains_key(&BOB));
    }

    #[test]
    fn sweep_keeps_buckets_still_refilling() {
        let mut bucket = TokenBucket::full(2, Duration::from_secs(2));
        let start = bucket.last_refill;
        assert!(bucket.try_consume(start).is_ok());
        assert!(bucket.try_consume(start).is_ok());

        let mut buckets = Buckets {
            by_client: HashMap::from([(ALICE, bucket)]),
            last_sweep: start,
        };

        buckets.sweep(start + Duration::from_secs(1));
        assert!(buckets.by_client.contains_key(&ALICE));

        buckets.sweep(start + Duration::from_secs(2));
        assert!(buckets.by_client.is_empty());
    }

    #[test]
    fn bucket_refills_over_time() {
        let mut bucket = TokenBucket::full(2, Duration::from_secs(2));
        let start = bucket.last_refill;

        assert!(bucket.try_consume(start).is_ok());
        assert!(bucket.try_consume(start).is_ok());
        assert!(bucket.try_consume(start).is_err());
        assert!(bucket.try_consume(start + Duration::from_secs(1)).is_ok());
    }
}
