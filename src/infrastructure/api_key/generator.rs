//! API Key generation
//!
//! Generates cryptographically secure API keys and the non-secret values
//! derived from them.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix carried by every key
pub const KEY_PREFIX: &str = "mk_";

/// Characters of the random body included in the lookup prefix
const LOOKUP_CHARS: usize = 8;

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// The lookup prefix used to narrow authentication candidates
    pub prefix: String,
}

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Number of random bytes to generate
    key_bytes: usize,
}

impl ApiKeyGenerator {
    /// 24 random bytes encode to a 32 character body
    pub fn new() -> Self {
        Self { key_bytes: 24 }
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes;
        self
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let key = format!("{}{}", KEY_PREFIX, URL_SAFE_NO_PAD.encode(&random_bytes));
        let prefix = Self::extract_prefix(&key).unwrap_or(KEY_PREFIX).to_string();

        GeneratedApiKey { key, prefix }
    }

    /// Lookup prefix of a presented key (`mk_` + first 8 body chars)
    ///
    /// Returns `None` for anything that cannot be one of our keys.
    pub fn extract_prefix(key: &str) -> Option<&str> {
        let body = key.strip_prefix(KEY_PREFIX)?;

        if body.len() < LOOKUP_CHARS || !body.is_char_boundary(LOOKUP_CHARS) {
            return None;
        }

        Some(&key[..KEY_PREFIX.len() + LOOKUP_CHARS])
    }

    /// Non-reversible identifier of a key, used to partition rate limit counters
    pub fn subject_hash(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key() {
        let generated = ApiKeyGenerator::new().generate();

        assert!(generated.key.starts_with("mk_"));
        assert_eq!(generated.key.len(), "mk_".len() + 32);
        assert_eq!(generated.prefix.len(), "mk_".len() + 8);
        assert!(generated.key.starts_with(&generated.prefix));
    }

    #[test]
    fn test_key_is_url_safe() {
        let generated = ApiKeyGenerator::new().generate();

        assert!(generated.key[3..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::new();
        let keys: std::collections::HashSet<String> =
            (0..200).map(|_| generator.generate().key).collect();

        assert_eq!(keys.len(), 200);
    }

    #[test]
    fn test_custom_key_bytes() {
        let generated = ApiKeyGenerator::new().with_key_bytes(48).generate();

        assert_eq!(generated.key.len(), "mk_".len() + 64);
    }

    #[test]
    fn test_extract_prefix() {
        assert_eq!(
            ApiKeyGenerator::extract_prefix("mk_abc12345xyz"),
            Some("mk_abc12345")
        );
        assert_eq!(ApiKeyGenerator::extract_prefix("mk_abc"), None);
        assert_eq!(ApiKeyGenerator::extract_prefix("pk_live_abc12345"), None);
        assert_eq!(ApiKeyGenerator::extract_prefix(""), None);
    }

    #[test]
    fn test_subject_hash() {
        let first = ApiKeyGenerator::subject_hash("mk_test");

        assert_eq!(first, ApiKeyGenerator::subject_hash("mk_test"));
        assert_ne!(first, ApiKeyGenerator::subject_hash("mk_other"));
        assert!(!first.contains("mk_test"));
    }
}
