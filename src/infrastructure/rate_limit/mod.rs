//! Rate limiting infrastructure: counter stores and the fixed-window limiter

mod in_memory;
mod limiter;
mod redis;

pub use in_memory::InMemoryCounterStore;
pub use limiter::RateLimiter;
pub use self::redis::{RedisCounterConfig, RedisCounterStore};
