//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, DatabaseConfig, HashingConfig, LogFormat, LoggingConfig,
    RateLimitConfig, RedisConfig, ServerConfig, TimeoutConfig,
};
