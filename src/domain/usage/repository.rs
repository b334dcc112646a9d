//! Usage repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{UsageBreakdown, UsageRecord};
use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

/// Append-only store of usage records
#[async_trait]
pub trait UsageRepository: Send + Sync + Debug {
    /// Append one record
    async fn record(&self, record: UsageRecord) -> Result<(), DomainError>;

    /// All records for a key, oldest first
    async fn list_for_key(&self, api_key_id: ApiKeyId) -> Result<Vec<UsageRecord>, DomainError>;

    /// Aggregated counts for a key
    async fn breakdown_for_key(&self, api_key_id: ApiKeyId) -> Result<UsageBreakdown, DomainError> {
        let records = self.list_for_key(api_key_id).await?;
        Ok(UsageBreakdown::from_records(&records))
    }
}
