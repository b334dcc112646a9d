//! API middleware components

pub mod admin_guard;
pub mod auth;
pub mod context;
pub mod deadline;
pub mod logging;
pub mod rate_limit;
pub mod usage;

pub use admin_guard::admin_guard;
pub use auth::auth_gate;
pub use context::{CallerContext, ADMIN_KEY_HEADER, API_KEY_HEADER, FORWARDED_FOR_HEADER};
pub use deadline::RequestDeadline;
pub use logging::logging_middleware;
pub use rate_limit::{admin_quota, caller_quota};
pub use usage::record_usage;
