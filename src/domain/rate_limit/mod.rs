//! Rate limiting domain
//!
//! Fixed-window request quotas backed by an atomic shared counter.

mod counter;
mod window;

pub use counter::CounterStore;
pub use window::FixedWindow;

#[cfg(test)]
pub use counter::mock;

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Post-increment count for the current window
    pub count: u64,
    /// Total limit for the window
    pub limit: u32,
    /// Seconds until the window rolls over
    pub reset_in_seconds: u64,
}

impl RateLimitResult {
    pub fn remaining(&self) -> u64 {
        u64::from(self.limit).saturating_sub(self.count)
    }
}
