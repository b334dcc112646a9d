//! Redis counter store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::rate_limit::CounterStore;
use crate::domain::DomainError;

/// Configuration for the Redis counter store
#[derive(Debug, Clone)]
pub struct RedisCounterConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl RedisCounterConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: None,
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Counter store backed by Redis `INCR`/`EXPIRE`
///
/// `INCR` is atomic on the server, so concurrent increments from any number
/// of instances are never lost.
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
    config: RedisCounterConfig,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCounterStore {
    /// Connect to Redis
    pub async fn new(config: RedisCounterConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let value: i64 = conn.incr(&prefixed_key, 1).await.map_err(|e| {
            DomainError::cache(format!("Failed to increment key '{}': {}", key, e))
        })?;

        Ok(value.max(0) as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs = ttl.as_secs().max(1) as i64;

        let _: bool = conn.expire(&prefixed_key, ttl_secs).await.map_err(|e| {
            DomainError::cache(format!("Failed to update TTL for key '{}': {}", key, e))
        })?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis ping failed: {}", e)))?;

        Ok(())
    }
}
