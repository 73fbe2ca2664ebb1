//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the instant type used for transition records,
//! deadline comparisons, and clock readings.
//!
//! ## Normalization
//!
//! Host applications store deadlines in whatever shape their front end
//! produced: `2026-03-01T17:00:00.000Z`, `2026-03-01T18:00:00+01:00`, or a
//! bare `2026-03-01`. All of them are normalized here to UTC with seconds
//! precision, so that deadline comparisons never depend on the offset the
//! value happened to be written with.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// A UTC instant truncated to seconds precision.
///
/// Serializes as an RFC 3339 string with `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Wrap a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp with any offset, converting to UTC.
    pub fn parse(s: &str) -> Result<Self, AtlasError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            AtlasError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse either an RFC 3339 timestamp or a calendar date (`YYYY-MM-DD`).
    ///
    /// Calendar dates resolve to midnight UTC.
    pub fn parse_date_or_datetime(s: &str) -> Result<Self, AtlasError> {
        if let Ok(ts) = Self::parse(s) {
            return Ok(ts);
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            AtlasError::InvalidTimestamp(format!(
                "expected RFC 3339 timestamp or YYYY-MM-DD date, got {s:?}"
            ))
        })?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AtlasError::InvalidTimestamp(format!("no midnight for {s:?}")))?;
        Ok(Self(Utc.from_utc_datetime(&midnight)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `self + delta`, or `None` on overflow.
    pub fn checked_add(&self, delta: Duration) -> Option<Self> {
        self.0.checked_add_signed(delta).map(Self::from_utc)
    }

    /// `self - delta`, or `None` on overflow.
    pub fn checked_sub(&self, delta: Duration) -> Option<Self> {
        self.0.checked_sub_signed(delta).map(Self::from_utc)
    }

    /// Render as ISO 8601 with `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_date_or_datetime(s)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
