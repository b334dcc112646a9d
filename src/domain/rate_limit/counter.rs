//! Shared counter store trait

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::domain::DomainError;

/// Store of ephemeral request counters shared by every server instance
#[async_trait]
pub trait CounterStore: Send + Sync + Debug {
    /// Atomically increment `key` and return the post-increment value
    async fn increment(&self, key: &str) -> Result<u64, DomainError>;

    /// Set the time-to-live of `key`
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), DomainError>;
}
