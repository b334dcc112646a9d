//! Application state for shared services

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::usage::UsageSummary;
use crate::domain::{Clock, DomainError};
use crate::infrastructure::api_key::{
    ApiKeyService, AuthResult, CreateApiKeyResult, GenerateApiKeyRequest, OperationResult,
    WhitelistResult,
};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::usage::UsageRecorder;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
    pub rate_limiter: RateLimiter,
    pub usage_recorder: UsageRecorder,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        api_key_service: Arc<dyn ApiKeyServiceTrait>,
        rate_limiter: RateLimiter,
        usage_recorder: UsageRecorder,
        clock: Arc<dyn Clock>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            api_key_service,
            rate_limiter,
            usage_recorder,
            clock,
            config,
        }
    }
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn generate(&self, request: GenerateApiKeyRequest) -> Result<CreateApiKeyResult, DomainError>;
    async fn authenticate(&self, secret: &str) -> Result<AuthResult, DomainError>;
    async fn revoke(&self, secret: &str) -> Result<OperationResult, DomainError>;
    async fn delete(&self, id: ApiKeyId) -> Result<OperationResult, DomainError>;
    async fn add_to_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistResult, DomainError>;
    async fn remove_from_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistResult, DomainError>;
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;
    async fn get_usage(&self, secret: &str) -> Result<Option<UsageSummary>, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn generate(&self, request: GenerateApiKeyRequest) -> Result<CreateApiKeyResult, DomainError> {
        ApiKeyService::generate(self, request).await
    }

    async fn authenticate(&self, secret: &str) -> Result<AuthResult, DomainError> {
        ApiKeyService::authenticate(self, secret).await
    }

    async fn revoke(&self, secret: &str) -> Result<OperationResult, DomainError> {
        ApiKeyService::revoke(self, secret).await
    }

    async fn delete(&self, id: ApiKeyId) -> Result<OperationResult, DomainError> {
        ApiKeyService::delete(self, id).await
    }

    async fn add_to_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistResult, DomainError> {
        ApiKeyService::add_to_whitelist(self, id, ip).await
    }

    async fn remove_from_whitelist(&self, id: ApiKeyId, ip: &str) -> Result<WhitelistResult, DomainError> {
        ApiKeyService::remove_from_whitelist(self, id, ip).await
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        ApiKeyService::list(self).await
    }

    async fn get_usage(&self, secret: &str) -> Result<Option<UsageSummary>, DomainError> {
        ApiKeyService::get_usage(self, secret).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        ApiKeyService::ping(self).await
    }
}
