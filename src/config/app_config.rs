use std::time::Duration;

use serde::Deserialize;

use crate::domain::api_key::Tier;

/// Application configuration
///
/// Loaded once at start and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub admin: AdminConfig,
    pub hashing: HashingConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the client IP from the first `X-Forwarded-For` hop
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Relational store; in-memory repositories are used when `url` is unset
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Counter store; an in-process store is used when `url` is unset
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub free_tier_limit: u32,
    pub pro_tier_limit: u32,
    /// Per caller IP on admin routes
    pub admin_limit: u32,
    pub window_minutes: u32,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for admin routes; unset rejects every admin request
    pub secret: Option<String>,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for each relational or counter store call
    pub store_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            trust_forwarded_for: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            free_tier_limit: 10,
            pro_tier_limit: 50,
            admin_limit: 100,
            window_minutes: 10,
        }
    }
}

impl RateLimitConfig {
    pub fn limit_for(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Free => self.free_tier_limit,
            Tier::Pro => self.pro_tier_limit,
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { store_ms: 2_000 }
    }
}

impl TimeoutConfig {
    pub fn store(&self) -> Duration {
        Duration::from_millis(self.store_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self, config::ConfigError> {
        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let rate_limit = &self.rate_limit;

        if !(1..=60).contains(&rate_limit.window_minutes) {
            return Err(config::ConfigError::Message(format!(
                "rate_limit.window_minutes must be between 1 and 60, got {}",
                rate_limit.window_minutes
            )));
        }

        for (name, value) in [
            ("free_tier_limit", rate_limit.free_tier_limit),
            ("pro_tier_limit", rate_limit.pro_tier_limit),
            ("admin_limit", rate_limit.admin_limit),
        ] {
            if value == 0 {
                return Err(config::ConfigError::Message(format!(
                    "rate_limit.{} must be greater than zero",
                    name
                )));
            }
        }

        if self.timeouts.store_ms == 0 {
            return Err(config::ConfigError::Message(
                "timeouts.store_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(secret) = self.admin.secret.as_deref() {
            if secret.trim().is_empty() {
                return Err(config::ConfigError::Message(
                    "admin.secret must not be blank when set".to_string(),
                ));
            }

            // Header values arrive trimmed, so padding could never match.
            if secret.trim() != secret {
                return Err(config::ConfigError::Message(
                    "admin.secret must not have leading or trailing whitespace".to_string(),
                ));
            }
        }

        Ok(())
    }
}
