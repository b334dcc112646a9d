//! Time source abstraction

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Source of the current time for expiry checks, window arithmetic and timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
