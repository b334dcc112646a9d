//! In-process counter store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::rate_limit::CounterStore;
use crate::domain::{Clock, DomainError, SystemClock};

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Option<DateTime<Utc>>,
}

impl Counter {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

const CLEANUP_INTERVAL_SECS: i64 = 60;

#[derive(Debug)]
struct Counters {
    entries: HashMap<String, Counter>,
    last_cleanup: DateTime<Utc>,
}

impl Counters {
    /// Sweep expired entries at most once per cleanup interval
    fn maybe_cleanup(&mut self, now: DateTime<Utc>) {
        if now - self.last_cleanup < chrono::Duration::seconds(CLEANUP_INTERVAL_SECS) {
            return;
        }

        self.entries.retain(|_, counter| !counter.is_expired(now));
        self.last_cleanup = now;
    }
}

/// Counter store for a single process
///
/// Counters expire on the injected clock. An expired counter restarts from
/// zero on its next increment; other expired entries are swept periodically.
#[derive(Debug)]
pub struct InMemoryCounterStore {
    counters: Mutex<Counters>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let last_cleanup = clock.now();
        Self {
            counters: Mutex::new(Counters {
                entries: HashMap::new(),
                last_cleanup,
            }),
            clock,
        }
    }

    /// Current value of a live counter
    pub fn get(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        let counters = self.counters.lock().ok()?;

        counters
            .entries
            .get(key)
            .filter(|counter| !counter.is_expired(now))
            .map(|counter| counter.count)
    }

    /// Expiry set on a counter, if any
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let counters = self.counters.lock().ok()?;
        counters.entries.get(key).and_then(|counter| counter.expires_at)
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.counters
            .lock()
            .map(|counters| counters.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every counter
    pub fn clear(&self) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.entries.clear();
        }
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| DomainError::cache(format!("Failed to acquire counter lock: {}", e)))?;

        counters.maybe_cleanup(now);

        let counter = counters.entries.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: None,
        });
        if counter.is_expired(now) {
            *counter = Counter {
                count: 0,
                expires_at: None,
            };
        }
        counter.count += 1;

        Ok(counter.count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DomainError::cache(format!("Invalid TTL: {}", e)))?;
        let expires_at = self.clock.now() + ttl;

        let mut counters = self
            .counters
            .lock()
            .map_err(|e| DomainError::cache(format!("Failed to acquire counter lock: {}", e)))?;

        if let Some(counter) = counters.entries.get_mut(key) {
            counter.expires_at = Some(expires_at);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
