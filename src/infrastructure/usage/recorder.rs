//! Best-effort usage recording off the response path

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::usage::{UsageRecord, UsageRepository};
use crate::infrastructure::deadline::with_deadline;

/// Appends usage records in background tasks
///
/// Failures, including a lapsed deadline, are logged and dropped. Nothing is
/// retried.
#[derive(Debug, Clone)]
pub struct UsageRecorder {
    repository: Arc<dyn UsageRepository>,
    timeout: Duration,
}

impl UsageRecorder {
    pub fn new(repository: Arc<dyn UsageRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// Spawn the write and return immediately
    pub fn record(&self, record: UsageRecord) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let api_key_id = record.api_key_id;
            let endpoint = record.endpoint.clone();

            match with_deadline(timeout, "record usage", repository.record(record)).await {
                Ok(()) => debug!(api_key_id = %api_key_id, endpoint = %endpoint, "Usage recorded"),
                Err(e) => warn!(
                    api_key_id = %api_key_id,
                    endpoint = %endpoint,
                    error = %e,
                    "Failed to record API usage"
                ),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::ApiKeyId;
    use crate::domain::usage::mock::UnavailableUsageRepository;
    use crate::infrastructure::usage::InMemoryUsageRepository;
    use chrono::Utc;

    fn record() -> UsageRecord {
        UsageRecord {
            timestamp: Utc::now(),
            endpoint: "/api/keys/validate".to_string(),
            ip_address: "127.0.0.1".to_string(),
            status_code: 200,
            api_key_id: ApiKeyId::new(1),
        }
    }

    #[tokio::test]
    async fn test_records_in_background() {
        let repo = Arc::new(InMemoryUsageRepository::new());
        let recorder = UsageRecorder::new(repo.clone(), Duration::from_secs(1));

        recorder.record(record()).await.unwrap();

        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_propagate() {
        let recorder = UsageRecorder::new(Arc::new(UnavailableUsageRepository), Duration::from_secs(1));

        // The task completes normally; the error only reaches the log
        assert!(recorder.record(record()).await.is_ok());
    }
}
