//! API Key service
//!
//! Key lifecycle: generation, authentication, revocation, deletion, whitelist
//! management and usage reporting. Every store call runs under the configured
//! deadline; a lapsed deadline surfaces as [`DomainError::Timeout`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    validate_expiration, validate_key_name, ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyStatus,
    NewApiKey, Tier, WhitelistChange,
};
use crate::domain::ip::normalize_ip;
use crate::domain::usage::{UsageRepository, UsageSummary};
use crate::domain::{Clock, DomainError, SystemClock};
use crate::infrastructure::deadline::with_deadline;

use super::generator::ApiKeyGenerator;
use super::hasher::KeyHasher;

/// Reason reported for every failed authentication
pub const INVALID_KEY_REASON: &str = "Invalid or expired API key";

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Input for generating a key
#[derive(Debug, Clone)]
pub struct GenerateApiKeyRequest {
    pub name: String,
    pub tier: Tier,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of creating a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The API key entity (without the secret)
    pub api_key: ApiKey,
    /// The full secret key (only returned once)
    pub secret: String,
}

/// Outcome of authenticating a presented secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub is_valid: bool,
    pub id: Option<ApiKeyId>,
    pub tier: Option<Tier>,
    pub ip_whitelist: Vec<String>,
    pub reason: Option<String>,
}

impl AuthResult {
    fn valid(key: &ApiKey) -> Self {
        Self {
            is_valid: true,
            id: Some(key.id()),
            tier: Some(key.tier()),
            ip_whitelist: key.ip_whitelist().to_vec(),
            reason: None,
        }
    }

    /// Same answer for unknown, revoked and expired keys
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            id: None,
            tier: None,
            ip_whitelist: Vec::new(),
            reason: Some(INVALID_KEY_REASON.to_string()),
        }
    }
}

/// Success flag and message for operations whose failure is an expected outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of a whitelist mutation, carrying the full list afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistResult {
    pub success: bool,
    pub message: String,
    pub whitelisted_ips: Vec<String>,
}

impl WhitelistResult {
    fn from_change(change: WhitelistChange, updated: &str, unchanged: &str) -> Self {
        match change {
            WhitelistChange::Updated(ips) => Self {
                success: true,
                message: updated.to_string(),
                whitelisted_ips: ips,
            },
            WhitelistChange::Unchanged(ips) => Self {
                success: false,
                message: unchanged.to_string(),
                whitelisted_ips: ips,
            },
            WhitelistChange::KeyNotFound => Self {
                success: false,
                message: "API key not found".to_string(),
                whitelisted_ips: Vec::new(),
            },
        }
    }
}

/// API Key service for managing API keys
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    usage_repository: Arc<dyn UsageRepository>,
    hasher: Arc<dyn KeyHasher>,
    generator: ApiKeyGenerator,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(
        repository: Arc<R>,
        usage_repository: Arc<dyn UsageRepository>,
        hasher: Arc<dyn KeyHasher>,
    ) -> Self {
        Self {
            repository,
            usage_repository,
            hasher,
            generator: ApiKeyGenerator::new(),
            clock: Arc::new(SystemClock),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deadline applied to each store call
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Generate and persist a new key
    ///
    /// The plaintext secret is returned here and nowhere else.
    pub async fn generate(
        &self,
        request: GenerateApiKeyRequest,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let now = self.clock.now();

        validate_key_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_expiration(request.expires_at, now)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let generated = self.generator.generate();
        let key_hash = self.hash_secret(&generated.key).await?;

        let new_key = NewApiKey {
            key_hash,
            key_prefix: generated.prefix,
            name: request.name.trim().to_string(),
            tier: request.tier,
            created_at: now,
            expires_at: request.expires_at,
        };

        let api_key = with_deadline(
            self.store_timeout,
            "create API key",
            self.repository.create(new_key),
        )
        .await?;

        info!("API key created: id={}, tier={}", api_key.id(), api_key.tier());

        Ok(CreateApiKeyResult {
            api_key,
            secret: generated.key,
        })
    }

    /// Authenticate a presented secret and stamp `last_used_at` on success
    pub async fn authenticate(&self, secret: &str) -> Result<AuthResult, DomainError> {
        let Some(api_key) = self.find_authenticatable(secret).await? else {
            return Ok(AuthResult::invalid());
        };

        with_deadline(
            self.store_timeout,
            "update last_used_at",
            self.repository.record_usage(api_key.id(), self.clock.now()),
        )
        .await?;

        Ok(AuthResult::valid(&api_key))
    }

    /// Revoke the key matching `secret`
    ///
    /// Unknown and already revoked keys are reported, not raised.
    pub async fn revoke(&self, secret: &str) -> Result<OperationResult, DomainError> {
        let Some(prefix) = ApiKeyGenerator::extract_prefix(secret) else {
            return Ok(OperationResult::failed("API key not found"));
        };

        let candidates = with_deadline(
            self.store_timeout,
            "find API keys",
            self.repository.find_by_prefix(prefix),
        )
        .await?;

        let Some(api_key) = self.verify_candidates(secret, candidates).await? else {
            return Ok(OperationResult::failed("API key not found"));
        };

        if api_key.status() == ApiKeyStatus::Revoked {
            return Ok(OperationResult::failed("API key is already revoked"));
        }

        let revoked = with_deadline(
            self.store_timeout,
            "revoke API key",
            self.repository.revoke(api_key.id()),
        )
        .await?;

        if !revoked {
            return Ok(OperationResult::failed("API key is already revoked"));
        }

        info!("API key revoked: id={}", api_key.id());
        Ok(OperationResult::ok("API key revoked successfully"))
    }

    /// Hard delete by id; usage records go with it
    pub async fn delete(&self, id: ApiKeyId) -> Result<OperationResult, DomainError> {
        let deleted = with_deadline(
            self.store_timeout,
            "delete API key",
            self.repository.delete(id),
        )
        .await?;

        if !deleted {
            return Ok(OperationResult::failed("API key not found"));
        }

        info!("API key deleted: id={}", id);
        Ok(OperationResult::ok("API key deleted successfully"))
    }

    /// Whitelist an IP for a key
    pub async fn add_to_whitelist(
        &self,
        id: ApiKeyId,
        ip: &str,
    ) -> Result<WhitelistResult, DomainError> {
        let ip = parse_ip(ip)?;

        let change = with_deadline(
            self.store_timeout,
            "add whitelist entry",
            self.repository.add_to_whitelist(id, &ip),
        )
        .await?;

        debug!("Whitelist add for key {}: {}", id, ip);

        Ok(WhitelistResult::from_change(
            change,
            "IP address added to whitelist",
            "IP address is already whitelisted",
        ))
    }

    /// Remove an IP from a key's whitelist
    pub async fn remove_from_whitelist(
        &self,
        id: ApiKeyId,
        ip: &str,
    ) -> Result<WhitelistResult, DomainError> {
        let ip = parse_ip(ip)?;

        let change = with_deadline(
            self.store_timeout,
            "remove whitelist entry",
            self.repository.remove_from_whitelist(id, &ip),
        )
        .await?;

        debug!("Whitelist remove for key {}: {}", id, ip);

        Ok(WhitelistResult::from_change(
            change,
            "IP address removed from whitelist",
            "IP address is not in the whitelist",
        ))
    }

    /// Get an API key by ID
    pub async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        with_deadline(self.store_timeout, "get API key", self.repository.get(id)).await
    }

    /// List all API keys
    pub async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        with_deadline(self.store_timeout, "list API keys", self.repository.list()).await
    }

    /// Usage report for the key matching `secret`; `None` if it cannot authenticate
    pub async fn get_usage(&self, secret: &str) -> Result<Option<UsageSummary>, DomainError> {
        let Some(api_key) = self.find_authenticatable(secret).await? else {
            return Ok(None);
        };

        let breakdown = with_deadline(
            self.store_timeout,
            "aggregate usage",
            self.usage_repository.breakdown_for_key(api_key.id()),
        )
        .await?;

        Ok(Some(UsageSummary::new(&api_key, breakdown)))
    }

    /// Check that the credential store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        with_deadline(self.store_timeout, "count API keys", self.repository.count())
            .await
            .map(|_| ())
    }

    async fn find_authenticatable(&self, secret: &str) -> Result<Option<ApiKey>, DomainError> {
        let Some(prefix) = ApiKeyGenerator::extract_prefix(secret) else {
            debug!("Rejected API key with unrecognised format");
            return Ok(None);
        };

        let candidates = with_deadline(
            self.store_timeout,
            "find API keys",
            self.repository
                .find_authenticatable(prefix, self.clock.now()),
        )
        .await?;

        self.verify_candidates(secret, candidates).await
    }

    /// Run the slow verification on each candidate off the async workers
    async fn verify_candidates(
        &self,
        secret: &str,
        candidates: Vec<ApiKey>,
    ) -> Result<Option<ApiKey>, DomainError> {
        if candidates.is_empty() {
            return Ok(None);
        }

        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_string();

        tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .find(|candidate| hasher.verify(&secret, candidate.key_hash()))
        })
        .await
        .map_err(|e| {
            warn!("API key verification task failed: {}", e);
            DomainError::internal(format!("Key verification task failed: {}", e))
        })
    }

    async fn hash_secret(&self, secret: &str) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| DomainError::internal(format!("Key hashing task failed: {}", e)))?
    }
}

fn parse_ip(raw: &str) -> Result<String, DomainError> {
    normalize_ip(raw).ok_or_else(|| DomainError::validation("Invalid IP address format"))
}
