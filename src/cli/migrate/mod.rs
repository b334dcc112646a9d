//! Migrate command - applies the PostgreSQL schema and exits

use anyhow::Context;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, run_migrations, PostgresConfig};

/// Run pending migrations against `database.url`
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let url = config
        .database
        .url
        .as_deref()
        .context("database.url must be set to run migrations")?;

    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.database.max_connections),
    )
    .await?;

    run_migrations(&pool).await?;
    pool.close().await;

    info!("Migrations complete");

    Ok(())
}
