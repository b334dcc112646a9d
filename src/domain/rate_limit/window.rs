//! Fixed, clock-aligned rate limit windows

use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};

use crate::domain::DomainError;

/// Fixed window of `width_minutes`, aligned to the start of the hour
///
/// For a width of 10 the buckets start at `:00`, `:10`, `:20` and so on. When
/// the width does not divide 60 the last bucket of the hour is shorter; every
/// bucket ends no later than the top of the next hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow {
    width_minutes: u32,
}

impl FixedWindow {
    pub const MAX_WIDTH_MINUTES: u32 = 60;

    pub fn new(width_minutes: u32) -> Result<Self, DomainError> {
        if width_minutes == 0 || width_minutes > Self::MAX_WIDTH_MINUTES {
            return Err(DomainError::configuration(format!(
                "rate limit window must be between 1 and {} minutes, got {}",
                Self::MAX_WIDTH_MINUTES,
                width_minutes
            )));
        }

        Ok(Self { width_minutes })
    }

    pub fn width_minutes(&self) -> u32 {
        self.width_minutes
    }

    /// Counter time-to-live
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.width_minutes) * 60)
    }

    /// Start of the bucket containing `now`
    pub fn bucket_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let hour_start = truncate_to_hour(now);
        let minute = now.minute() / self.width_minutes * self.width_minutes;

        hour_start + Duration::minutes(i64::from(minute))
    }

    /// Exclusive end of the bucket containing `now`
    pub fn bucket_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let next_hour = truncate_to_hour(now) + Duration::hours(1);
        let end = self.bucket_start(now) + Duration::minutes(i64::from(self.width_minutes));

        end.min(next_hour)
    }

    /// Whole seconds until the bucket rolls over, rounded up and at least 1
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let remaining_ms = (self.bucket_end(now) - now).num_milliseconds().max(0) as u64;

        remaining_ms.div_ceil(1000).max(1)
    }

    /// Counter-store key for `subject` in the bucket containing `now`
    pub fn counter_key(&self, subject: &str, now: DateTime<Utc>) -> String {
        format!(
            "rateLimit:{}:{}",
            subject,
            self.bucket_start(now).format("%Y-%m-%d-%H:%M")
        )
    }
}

fn truncate_to_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}
