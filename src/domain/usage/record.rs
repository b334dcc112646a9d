//! Usage record entities and per-key aggregation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStatus, Tier};

/// One completed request made with an API key; never mutated after insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    /// Request path
    pub endpoint: String,
    pub ip_address: String,
    pub status_code: u16,
    pub api_key_id: ApiKeyId,
}

impl UsageRecord {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_failure(&self) -> bool {
        self.status_code >= 400
    }
}

/// Request count for one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointUsage {
    pub endpoint: String,
    pub count: u64,
}

/// Request count for one status code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCodeSummary {
    pub status_code: u16,
    pub count: u64,
}

/// Aggregated request counts for a key
///
/// Breakdowns are ordered by descending count, ties broken by endpoint or
/// status code so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageBreakdown {
    pub total_requests: u64,
    /// 2xx responses
    pub successful_requests: u64,
    /// 4xx and 5xx responses
    pub failed_requests: u64,
    pub endpoint_usage: Vec<EndpointUsage>,
    pub status_code_summaries: Vec<StatusCodeSummary>,
}

impl UsageBreakdown {
    pub fn from_records(records: &[UsageRecord]) -> Self {
        let mut endpoints: HashMap<&str, u64> = HashMap::new();
        let mut status_codes: HashMap<u16, u64> = HashMap::new();
        let mut breakdown = Self::default();

        for record in records {
            breakdown.total_requests += 1;

            if record.is_success() {
                breakdown.successful_requests += 1;
            } else if record.is_failure() {
                breakdown.failed_requests += 1;
            }

            *endpoints.entry(record.endpoint.as_str()).or_default() += 1;
            *status_codes.entry(record.status_code).or_default() += 1;
        }

        breakdown.endpoint_usage = endpoints
            .into_iter()
            .map(|(endpoint, count)| EndpointUsage {
                endpoint: endpoint.to_string(),
                count,
            })
            .collect();
        breakdown.status_code_summaries = status_codes
            .into_iter()
            .map(|(status_code, count)| StatusCodeSummary { status_code, count })
            .collect();
        breakdown.sort();

        breakdown
    }

    /// Apply the canonical ordering to both breakdowns
    pub fn sort(&mut self) {
        self.endpoint_usage
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.endpoint.cmp(&b.endpoint)));
        self.status_code_summaries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.status_code.cmp(&b.status_code))
        });
    }
}

/// Usage report returned to a key holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSummary {
    pub tier: Tier,
    pub status: ApiKeyStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub breakdown: UsageBreakdown,
}

impl UsageSummary {
    pub fn new(key: &ApiKey, breakdown: UsageBreakdown) -> Self {
        Self {
            tier: key.tier(),
            status: key.status(),
            created_at: key.created_at(),
            expires_at: key.expires_at(),
            last_used_at: key.last_used_at(),
            breakdown,
        }
    }
}
