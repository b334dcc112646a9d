//! Usage tracking infrastructure implementations

mod in_memory;
mod postgres_repository;
mod recorder;

pub use in_memory::InMemoryUsageRepository;
pub use postgres_repository::PostgresUsageRepository;
pub use recorder::UsageRecorder;
