//! Slow salted hashing of API key secrets using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::config::HashingConfig;
use crate::domain::DomainError;

/// Trait for secret hashing operations
pub trait KeyHasher: Send + Sync + Debug {
    /// Hash a secret with a fresh salt
    fn hash(&self, secret: &str) -> Result<String, DomainError>;

    /// Verify a secret against a stored hash
    fn verify(&self, secret: &str, hash: &str) -> bool;
}

/// Argon2id hasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &HashingConfig) -> Result<Self, DomainError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl KeyHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash API key: {}", e)))
    }

    /// Parameters are read from the stored hash, so keys hashed under older
    /// settings still verify.
    fn verify(&self, secret: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2()
            .verify_password(secret.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(&HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
