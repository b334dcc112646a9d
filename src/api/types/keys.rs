//! Request and response bodies for the key endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::api_key::{ApiKey, ApiKeyStatus, Tier};
use crate::domain::usage::{EndpointUsage, StatusCodeSummary, UsageSummary};
use crate::infrastructure::api_key::{CreateApiKeyResult, OperationResult, WhitelistResult};

/// Body carrying a key secret
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyRequest {
    pub key: Option<String>,
}

impl KeyRequest {
    /// The trimmed key, or `None` when absent or blank
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Returned once, at generation; the only place the secret appears
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyResponse {
    pub key: String,
    pub id: i64,
    pub name: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateApiKeyResult> for GenerateKeyResponse {
    fn from(result: CreateApiKeyResult) -> Self {
        let api_key = result.api_key;

        Self {
            key: result.secret,
            id: api_key.id().value(),
            name: api_key.name().to_string(),
            tier: api_key.tier(),
            created_at: api_key.created_at(),
            expires_at: api_key.expires_at(),
        }
    }
}

/// Listing entry; never includes the hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummaryResponse {
    pub id: i64,
    pub name: String,
    pub tier: Tier,
    pub status: ApiKeyStatus,
    pub key_prefix: String,
    pub ip_whitelist: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&ApiKey> for ApiKeySummaryResponse {
    fn from(api_key: &ApiKey) -> Self {
        Self {
            id: api_key.id().value(),
            name: api_key.name().to_string(),
            tier: api_key.tier(),
            status: api_key.status(),
            key_prefix: api_key.key_prefix().to_string(),
            ip_whitelist: api_key.ip_whitelist().to_vec(),
            created_at: api_key.created_at(),
            expires_at: api_key.expires_at(),
            last_used_at: api_key.last_used_at(),
        }
    }
}

/// List API keys response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeySummaryResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteKeyRequest {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistRequest {
    pub id: i64,
    #[serde(default)]
    pub ip_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
}

impl From<OperationResult> for OperationResponse {
    fn from(result: OperationResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistResponse {
    pub success: bool,
    pub message: String,
    pub whitelisted_ips: Vec<String>,
}

impl From<WhitelistResult> for WhitelistResponse {
    fn from(result: WhitelistResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            whitelisted_ips: result.whitelisted_ips,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummaryResponse {
    pub tier: Tier,
    pub status: ApiKeyStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub endpoint_usage: Vec<EndpointUsage>,
    pub status_code_summaries: Vec<StatusCodeSummary>,
}

impl From<UsageSummary> for UsageSummaryResponse {
    fn from(summary: UsageSummary) -> Self {
        let breakdown = summary.breakdown;

        Self {
            tier: summary.tier,
            status: summary.status,
            created_at: summary.created_at,
            expires_at: summary.expires_at,
            last_used_at: summary.last_used_at,
            total_requests: breakdown.total_requests,
            successful_requests: breakdown.successful_requests,
            failed_requests: breakdown.failed_requests,
            endpoint_usage: breakdown.endpoint_usage,
            status_code_summaries: breakdown.status_code_summaries,
        }
    }
}
