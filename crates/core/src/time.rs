//! Nanosecond timestamps and the calendar-date codec.
//!
//! The store boundary speaks integer nanoseconds since the Unix epoch; reports
//! bucket by UTC calendar month. Date strings (`YYYY-MM-DD`) map to midnight
//! UTC, so the day-granularity round-trip is exact in both directions.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An instant, stored as signed nanoseconds since the Unix epoch (UTC).
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// The current instant. Saturates at the representable range boundary.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> DomainResult<Self> {
        dt.timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| DomainError::validation("instant outside nanosecond range"))
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    /// Parse a `YYYY-MM-DD` date string as midnight UTC.
    pub fn from_date_str(input: &str) -> DomainResult<Self> {
        let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map_err(|e| DomainError::validation(format!("invalid date {input:?}: {e}")))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DomainError::validation(format!("invalid date {input:?}")))?;
        Self::from_datetime(midnight.and_utc())
    }

    /// Render the UTC calendar date as `YYYY-MM-DD`.
    pub fn to_date_string(self) -> String {
        self.to_datetime().format("%Y-%m-%d").to_string()
    }

    pub fn year(self) -> i32 {
        self.to_datetime().year()
    }

    /// Calendar month, 1 through 12.
    pub fn month(self) -> u32 {
        self.to_datetime().month()
    }
}

impl ValueObject for Timestamp {}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_datetime().to_rfc3339())
    }
}
