//! PostgreSQL usage repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{
    EndpointUsage, StatusCodeSummary, UsageBreakdown, UsageRecord, UsageRepository,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of UsageRepository
#[derive(Debug, Clone)]
pub struct PostgresUsageRepository {
    pool: PgPool,
}

impl PostgresUsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepository {
    async fn record(&self, record: UsageRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_usages (timestamp, endpoint, ip_address, status_code, api_key_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.endpoint)
        .bind(&record.ip_address)
        .bind(i32::from(record.status_code))
        .bind(record.api_key_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to record usage: {}", e)))?;

        Ok(())
    }

    async fn list_for_key(&self, api_key_id: ApiKeyId) -> Result<Vec<UsageRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT timestamp, endpoint, ip_address, status_code, api_key_id
            FROM api_usages
            WHERE api_key_id = $1
            ORDER BY timestamp, id
            "#,
        )
        .bind(api_key_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list usage: {}", e)))?;

        rows.iter().map(row_to_record).collect()
    }

    /// Aggregates in the database instead of loading every record
    async fn breakdown_for_key(&self, api_key_id: ApiKeyId) -> Result<UsageBreakdown, DomainError> {
        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status_code BETWEEN 200 AND 299) AS successful,
                   COUNT(*) FILTER (WHERE status_code >= 400) AS failed
            FROM api_usages
            WHERE api_key_id = $1
            "#,
        )
        .bind(api_key_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate usage: {}", e)))?;

        let endpoints = sqlx::query(
            "SELECT endpoint, COUNT(*) AS count FROM api_usages WHERE api_key_id = $1 GROUP BY endpoint",
        )
        .bind(api_key_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate endpoints: {}", e)))?;

        let status_codes = sqlx::query(
            "SELECT status_code, COUNT(*) AS count FROM api_usages WHERE api_key_id = $1 GROUP BY status_code",
        )
        .bind(api_key_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate status codes: {}", e)))?;

        let mut breakdown = UsageBreakdown {
            total_requests: count(totals.get("total")),
            successful_requests: count(totals.get("successful")),
            failed_requests: count(totals.get("failed")),
            endpoint_usage: endpoints
                .iter()
                .map(|row| EndpointUsage {
                    endpoint: row.get("endpoint"),
                    count: count(row.get("count")),
                })
                .collect(),
            status_code_summaries: status_codes
                .iter()
                .map(|row| {
                    Ok(StatusCodeSummary {
                        status_code: status_code(row.get("status_code"))?,
                        count: count(row.get("count")),
                    })
                })
                .collect::<Result<_, DomainError>>()?,
        };
        breakdown.sort();

        Ok(breakdown)
    }
}

fn count(value: i64) -> u64 {
    value.max(0) as u64
}

fn status_code(value: i32) -> Result<u16, DomainError> {
    u16::try_from(value)
        .map_err(|_| DomainError::storage(format!("Invalid status code in database: {}", value)))
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<UsageRecord, DomainError> {
    Ok(UsageRecord {
        timestamp: row.get("timestamp"),
        endpoint: row.get("endpoint"),
        ip_address: row.get("ip_address"),
        status_code: status_code(row.get("status_code"))?,
        api_key_id: ApiKeyId::new(row.get("api_key_id")),
    })
}
