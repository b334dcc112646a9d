//! Fixed-window rate limiter

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::rate_limit::{CounterStore, FixedWindow, RateLimitResult};
use crate::domain::{Clock, DomainError};
use crate::infrastructure::deadline::with_deadline;

/// Rate limiter over a shared counter store
///
/// One atomic increment per request. The counter's TTL is set only by the
/// request that created it, so later hits never extend the window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    window: FixedWindow,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        window: FixedWindow,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            window,
            clock,
            timeout,
        }
    }

    pub fn window(&self) -> FixedWindow {
        self.window
    }

    /// Count one request for `subject` and compare against `limit`
    pub async fn check(&self, subject: &str, limit: u32) -> Result<RateLimitResult, DomainError> {
        let now = self.clock.now();
        let key = self.window.counter_key(subject, now);

        let count = with_deadline(self.timeout, "increment rate limit counter", self.store.increment(&key))
            .await?;

        if count == 1 {
            let ttl = self.window.ttl();

            // The admission decision stands; a missing TTL only delays cleanup
            if let Err(e) =
                with_deadline(self.timeout, "expire rate limit counter", self.store.expire(&key, ttl)).await
            {
                warn!(key = %key, error = %e, "Failed to set rate limit counter TTL");
            }
        }

        let allowed = count <= u64::from(limit);

        if !allowed {
            debug!(key = %key, count, limit, "Rate limit exceeded");
        }

        Ok(RateLimitResult {
            allowed,
            count,
            limit,
            reset_in_seconds: self.window.retry_after_seconds(now),
        })
    }

    /// Check that the counter store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        with_deadline(self.timeout, "ping counter store", self.store.ping()).await
    }
}
