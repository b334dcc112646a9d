//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod clock;
pub mod error;
pub mod ip;
pub mod rate_limit;
pub mod usage;

pub use clock::{Clock, SystemClock};
pub use error::DomainError;
