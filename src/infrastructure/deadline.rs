//! Request-scoped deadlines for store calls

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::domain::DomainError;

/// A single time budget shared by every dependency call of one request
///
/// Copies share the same instant, so a second call only gets what the first
/// one left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline that lapses `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Time left before the deadline lapses
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Run `future`, failing with [`DomainError::Timeout`] once the deadline lapses
    pub async fn run<T, F>(&self, operation: &str, future: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match timeout_at(self.at, future).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(format!(
                "{} after {}ms budget",
                operation,
                self.budget.as_millis()
            ))),
        }
    }
}

/// Run a single store call under a fresh deadline of `limit`
///
/// For calls made outside a request, and as a per-call cap inside one.
pub async fn with_deadline<T, F>(limit: Duration, operation: &str, future: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    Deadline::after(limit).run(operation, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sleep_then_ok(ms: u64) -> Result<(), DomainError> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), "fast", async { Ok::<_, DomainError>(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_is_timeout() {
        let result = with_deadline(Duration::from_millis(10), "slow lookup", sleep_then_ok(5_000)).await;

        match result {
            Err(DomainError::Timeout { operation }) => assert!(operation.starts_with("slow lookup")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_calls_share_one_budget() {
        let deadline = Deadline::after(Duration::from_millis(300));

        deadline.run("find key", sleep_then_ok(200)).await.unwrap();
        assert!(deadline.remaining() <= Duration::from_millis(100));

        // Fits a fresh 300ms budget, but not what is left of this one
        let result = deadline.run("increment counter", sleep_then_ok(200)).await;
        match result {
            Err(DomainError::Timeout { operation }) => assert!(operation.starts_with("increment counter")),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(deadline.is_elapsed());
    }

    #[tokio::test]
    async fn test_lapsed_deadline_fails_immediately() {
        let deadline = Deadline::after(Duration::ZERO);

        let result = deadline
            .run("ping", std::future::pending::<Result<(), DomainError>>())
            .await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
        assert!(deadline.is_elapsed());
    }
}
