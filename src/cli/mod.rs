//! CLI module for keygate
//!
//! Provides subcommands:
//! - `serve`: run the HTTP service (default)
//! - `migrate`: apply database migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// keygate - API key issuance, authentication and rate limiting
#[derive(Parser)]
#[command(name = "keygate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

/// Load `.env`, the layered configuration, and install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
