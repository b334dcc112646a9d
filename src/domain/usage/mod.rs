//! Usage tracking domain
//!
//! Append-only usage records (one per completed request) and their per-key
//! aggregation into success/failure counts and endpoint/status breakdowns.

mod record;
mod repository;

pub use record::{EndpointUsage, StatusCodeSummary, UsageBreakdown, UsageRecord, UsageSummary};
pub use repository::UsageRepository;

#[cfg(test)]
pub use repository::mock;
