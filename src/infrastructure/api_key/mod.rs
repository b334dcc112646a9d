//! API Key infrastructure implementations
//!
//! Key generation, Argon2 hashing, in-memory and PostgreSQL storage, and the
//! lifecycle service built on them.

mod generator;
pub(crate) mod hasher;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{ApiKeyGenerator, GeneratedApiKey, KEY_PREFIX};
pub use hasher::{Argon2Hasher, KeyHasher};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{
    ApiKeyService, AuthResult, CreateApiKeyResult, GenerateApiKeyRequest, OperationResult,
    WhitelistResult, INVALID_KEY_REASON,
};
