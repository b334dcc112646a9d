//! Storage infrastructure - PostgreSQL pool and schema

pub mod migrations;
mod postgres;

pub use migrations::{run_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
