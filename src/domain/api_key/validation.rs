//! API Key validation utilities

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while validating a key generation request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name must not exceed {0} characters")]
    NameTooLong(usize),

    #[error("ExpiresAt value must be in the future")]
    ExpirationNotInFuture,
}

pub const MAX_KEY_NAME_LENGTH: usize = 100;

/// Validate a key display name
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 100 characters
pub fn validate_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    if name.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if name.chars().count() > MAX_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_KEY_NAME_LENGTH));
    }

    Ok(())
}

/// Validate that an expiry, if given, lies strictly after `now`
pub fn validate_expiration(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), ApiKeyValidationError> {
    match expires_at {
        Some(expires_at) if expires_at <= now => Err(ApiKeyValidationError::ExpirationNotInFuture),
        _ => Ok(()),
    }
}
