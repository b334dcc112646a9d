//! API Key domain
//!
//! Domain types and the storage trait for API key records: identity, tier,
//! terminal revocation, IP whitelist and expiry rules.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, ApiKeyStatus, NewApiKey, Tier};
pub use repository::{ApiKeyRepository, WhitelistChange};
pub use validation::{
    validate_expiration, validate_key_name, ApiKeyValidationError, MAX_KEY_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::mock;
