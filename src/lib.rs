//! keygate
//!
//! API key issuance and authentication with:
//! - Argon2-hashed secrets shown once at generation
//! - Per-key client IP whitelists that fail closed
//! - Tiered fixed-window rate limiting over a shared counter store
//! - Best-effort per-request usage recording and summaries

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::{ApiKeyServiceTrait, AppState};
use domain::rate_limit::{CounterStore, FixedWindow};
use domain::usage::UsageRepository;
use domain::{Clock, DomainError, SystemClock};
use infrastructure::api_key::{
    ApiKeyService, Argon2Hasher, InMemoryApiKeyRepository, PostgresApiKeyRepository,
};
use infrastructure::rate_limit::{
    InMemoryCounterStore, RateLimiter, RedisCounterConfig, RedisCounterStore,
};
use infrastructure::storage::{connect_pool, run_migrations, PostgresConfig};
use infrastructure::usage::{InMemoryUsageRepository, PostgresUsageRepository, UsageRecorder};

/// Create the application state from configuration
///
/// PostgreSQL and Redis are used when their URLs are set; otherwise the
/// in-process stores stand in, which only suits a single instance.
pub async fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let hasher = Arc::new(Argon2Hasher::new(&config.hashing)?);
    let store_timeout = config.timeouts.store();

    let (api_key_service, usage_repository): (
        Arc<dyn ApiKeyServiceTrait>,
        Arc<dyn UsageRepository>,
    ) = match config.database.url.as_deref() {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(
                &PostgresConfig::new(url).with_max_connections(config.database.max_connections),
            )
            .await?;
            run_migrations(&pool).await?;
            info!("PostgreSQL connection established");

            let usage: Arc<dyn UsageRepository> =
                Arc::new(PostgresUsageRepository::new(pool.clone()));
            let service: Arc<dyn ApiKeyServiceTrait> = Arc::new(
                ApiKeyService::new(
                    Arc::new(PostgresApiKeyRepository::new(pool)),
                    usage.clone(),
                    hasher,
                )
                .with_clock(clock.clone())
                .with_store_timeout(store_timeout),
            );

            (service, usage)
        }
        None => {
            warn!("database.url not set; keys and usage are kept in memory only");

            let usage: Arc<dyn UsageRepository> = Arc::new(InMemoryUsageRepository::new());
            let service: Arc<dyn ApiKeyServiceTrait> = Arc::new(
                ApiKeyService::new(
                    Arc::new(InMemoryApiKeyRepository::new()),
                    usage.clone(),
                    hasher,
                )
                .with_clock(clock.clone())
                .with_store_timeout(store_timeout),
            );

            (service, usage)
        }
    };

    let counter_store: Arc<dyn CounterStore> = match config.redis.url.as_deref() {
        Some(url) => {
            info!("Connecting to Redis...");
            Arc::new(RedisCounterStore::new(RedisCounterConfig::new(url)).await?)
        }
        None => {
            warn!("redis.url not set; rate limit counters are per-process");
            Arc::new(InMemoryCounterStore::with_clock(clock.clone()))
        }
    };

    Ok(assemble_state(
        api_key_service,
        usage_repository,
        counter_store,
        clock,
        config,
    )?)
}

/// Build the state around already constructed stores
pub fn assemble_state(
    api_key_service: Arc<dyn ApiKeyServiceTrait>,
    usage_repository: Arc<dyn UsageRepository>,
    counter_store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
) -> Result<AppState, DomainError> {
    let window = FixedWindow::new(config.rate_limit.window_minutes)?;
    let store_timeout = config.timeouts.store();

    info!(
        window_minutes = window.width_minutes(),
        free_limit = config.rate_limit.free_tier_limit,
        pro_limit = config.rate_limit.pro_tier_limit,
        admin_limit = config.rate_limit.admin_limit,
        "Rate limiting configured"
    );

    let rate_limiter = RateLimiter::new(counter_store, window, clock.clone(), store_timeout);
    let usage_recorder = UsageRecorder::new(usage_repository, store_timeout);

    Ok(AppState::new(
        api_key_service,
        rate_limiter,
        usage_recorder,
        clock,
        Arc::new(config),
    ))
}
