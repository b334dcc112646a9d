//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, NewApiKey, WhitelistChange};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    keys: BTreeMap<ApiKeyId, ApiKey>,
}

/// In-memory implementation of ApiKeyRepository
///
/// Each mutation runs under one write lock, matching the single-statement
/// updates of the relational store.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate_whitelist(
        &self,
        id: ApiKeyId,
        change: impl FnOnce(&mut ApiKey) -> bool,
    ) -> Result<WhitelistChange, DomainError> {
        let mut inner = self.inner.write().await;

        let Some(key) = inner.keys.get_mut(&id) else {
            return Ok(WhitelistChange::KeyNotFound);
        };

        let changed = change(key);
        let ips = key.ip_whitelist().to_vec();

        Ok(if changed {
            WhitelistChange::Updated(ips)
        } else {
            WhitelistChange::Unchanged(ips)
        })
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.keys.values().any(|k| k.key_hash() == new_key.key_hash) {
            return Err(DomainError::storage("duplicate key hash"));
        }

        inner.next_id += 1;
        let id = ApiKeyId::new(inner.next_id);
        let api_key = ApiKey::new(id, new_key);

        inner.keys.insert(id, api_key.clone());
        Ok(api_key)
    }

    async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.keys.get(&id).cloned())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<ApiKey>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .keys
            .values()
            .filter(|k| k.key_prefix() == prefix)
            .cloned()
            .collect())
    }

    async fn find_authenticatable(
        &self,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ApiKey>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .keys
            .values()
            .filter(|k| k.key_prefix() == prefix && k.is_authenticatable(now))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.keys.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.keys.len())
    }

    async fn revoke(&self, id: ApiKeyId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;
        Ok(inner.keys.get_mut(&id).is_some_and(|key| key.revoke()))
    }

    async fn delete(&self, id: ApiKeyId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;
        Ok(inner.keys.remove(&id).is_some())
    }

    async fn add_to_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistChange, DomainError> {
        self.mutate_whitelist(id, |key| key.add_to_whitelist(ip)).await
    }

    async fn remove_from_whitelist(
        &self,
        id: ApiKeyId,
        ip: &str,
    ) -> Result<WhitelistChange, DomainError> {
        self.mutate_whitelist(id, |key| key.remove_from_whitelist(ip)).await
    }

    async fn record_usage(&self, id: ApiKeyId, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;

        if let Some(key) = inner.keys.get_mut(&id) {
            key.record_usage(at);
        }

        Ok(())
    }
}
