//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod deadline;
pub mod logging;
pub mod rate_limit;
pub mod storage;
pub mod usage;
