//! API Key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, NewApiKey};
use crate::domain::DomainError;

/// Outcome of a single-field whitelist mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistChange {
    /// The whitelist was modified; carries the full list afterwards
    Updated(Vec<String>),
    /// Duplicate add or missing remove; carries the current list
    Unchanged(Vec<String>),
    /// No key with that id
    KeyNotFound,
}

/// Repository trait for API key storage
///
/// Mutations are single-field updates so that concurrent authentications and
/// admin changes never overwrite each other's fields.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Persist a new key and assign its id
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, DomainError>;

    /// Get an API key by its id
    async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// All keys with the given lookup prefix, whatever their status
    async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<ApiKey>, DomainError>;

    /// Active, unexpired keys with the given lookup prefix
    async fn find_authenticatable(
        &self,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ApiKey>, DomainError>;

    /// List all keys ordered by id
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;

    /// Count stored keys
    async fn count(&self) -> Result<usize, DomainError>;

    /// Mark an active key revoked; false when missing or already revoked
    async fn revoke(&self, id: ApiKeyId) -> Result<bool, DomainError>;

    /// Hard delete; false when missing
    async fn delete(&self, id: ApiKeyId) -> Result<bool, DomainError>;

    /// Append a normalized IP to the whitelist
    async fn add_to_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistChange, DomainError>;

    /// Remove a normalized IP from the whitelist
    async fn remove_from_whitelist(
        &self,
        id: ApiKeyId,
        ip: &str,
    ) -> Result<WhitelistChange, DomainError>;

    /// Update `last_used_at`; last writer wins
    async fn record_usage(&self, id: ApiKeyId, at: DateTime<Utc>) -> Result<(), DomainError>;
}
