//! In-memory usage repository

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{UsageRecord, UsageRepository};
use crate::domain::DomainError;

/// In-memory usage repository
///
/// Append-only; records live for the lifetime of the process.
#[derive(Debug)]
pub struct InMemoryUsageRepository {
    records: RwLock<Vec<UsageRecord>>,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUsageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn record(&self, record: UsageRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        records.push(record);

        Ok(())
    }

    async fn list_for_key(&self, api_key_id: ApiKeyId) -> Result<Vec<UsageRecord>, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records
            .iter()
            .filter(|r| r.api_key_id == api_key_id)
            .cloned()
            .collect())
    }
}
