//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable integer identity assigned by the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(i64);

impl ApiKeyId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ApiKeyId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plan classifier controlling the request quota applied to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(Self::Free),
            "Pro" => Ok(Self::Pro),
            other => Err(format!("Unknown tier '{}'", other)),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an API key
///
/// `Revoked` is terminal: nothing transitions a key back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApiKeyStatus {
    #[default]
    Active,
    Revoked,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Revoked => "Revoked",
        }
    }
}

impl std::str::FromStr for ApiKeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Revoked" => Ok(Self::Revoked),
            other => Err(format!("Unknown status '{}'", other)),
        }
    }
}

/// A key that has been generated but not yet persisted
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Persisted API key record
///
/// Holds the one-way hash of the secret, never the secret itself.
#[derive(Debug, Clone)]
pub struct ApiKey {
    id: ApiKeyId,
    key_hash: String,
    /// Non-secret lookup prefix (`mk_` + first 8 chars of the random body)
    key_prefix: String,
    name: String,
    tier: Tier,
    status: ApiKeyStatus,
    /// Normalized IPs; empty means no IP is allowed
    ip_whitelist: Vec<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Create an active key with an empty whitelist
    pub fn new(id: ApiKeyId, new_key: NewApiKey) -> Self {
        Self {
            id,
            key_hash: new_key.key_hash,
            key_prefix: new_key.key_prefix,
            name: new_key.name,
            tier: new_key.tier,
            status: ApiKeyStatus::Active,
            ip_whitelist: Vec::new(),
            created_at: new_key.created_at,
            expires_at: new_key.expires_at,
            last_used_at: None,
        }
    }

    pub fn with_status(mut self, status: ApiKeyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_whitelist(mut self, ips: Vec<String>) -> Self {
        self.ip_whitelist = Vec::with_capacity(ips.len());

        for ip in ips {
            self.add_to_whitelist(ip);
        }

        self
    }

    pub fn with_last_used_at(mut self, last_used_at: Option<DateTime<Utc>>) -> Self {
        self.last_used_at = last_used_at;
        self
    }

    // Getters

    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn status(&self) -> ApiKeyStatus {
        self.status
    }

    pub fn ip_whitelist(&self) -> &[String] {
        &self.ip_whitelist
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    // Status checks

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Active and not past its expiry
    pub fn is_authenticatable(&self, now: DateTime<Utc>) -> bool {
        self.status == ApiKeyStatus::Active && !self.is_expired(now)
    }

    // Mutators

    /// Revoke the key; returns false when it was already revoked
    pub fn revoke(&mut self) -> bool {
        if self.status == ApiKeyStatus::Revoked {
            return false;
        }

        self.status = ApiKeyStatus::Revoked;
        true
    }

    /// Append an IP; returns false when it is already present
    pub fn add_to_whitelist(&mut self, ip: impl Into<String>) -> bool {
        let ip = ip.into();

        if self.ip_whitelist.contains(&ip) {
            return false;
        }

        self.ip_whitelist.push(ip);
        true
    }

    /// Remove an IP; returns false when it was not present
    pub fn remove_from_whitelist(&mut self, ip: &str) -> bool {
        let before = self.ip_whitelist.len();
        self.ip_whitelist.retain(|existing| existing != ip);
        self.ip_whitelist.len() != before
    }

    pub fn record_usage(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
    }
}
