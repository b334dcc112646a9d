use thiserror::Error;

/// Core domain errors
///
/// Expected outcomes of normal operation (already revoked, duplicate whitelist
/// entry, unknown id) are not errors; services report them through result
/// structs. Everything here is either bad input or a broken dependency.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Counter store error: {message}")]
    Cache { message: String },

    #[error("Timed out: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the error comes from a failing dependency rather than bad input
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Cache { .. } | Self::Timeout { .. } | Self::Internal { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("API key '7' not found");
        assert_eq!(error.to_string(), "Not found: API key '7' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Name is required");
        assert_eq!(error.to_string(), "Validation error: Name is required");
        assert!(!error.is_dependency_failure());
    }

    #[test]
    fn test_dependency_failures() {
        assert!(DomainError::storage("connection refused").is_dependency_failure());
        assert!(DomainError::cache("INCR failed").is_dependency_failure());
        assert!(DomainError::timeout("counter increment").is_dependency_failure());
        assert!(!DomainError::not_found("gone").is_dependency_failure());
    }
}
