use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Formats accepted for the `@timestamp` field, tried in order.
pub const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"];

#[derive(Debug, Error)]
#[error("failed to parse timestamp '{value}' with any known format")]
pub struct TimestampError {
    pub value: String,
}

/// Parse a backend timestamp as UTC.
///
/// Tries the fractional-seconds format first, then whole seconds.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .ok_or_else(|| TimestampError {
            value: value.to_string(),
        })
}

/// Parse a backend timestamp, falling back to the current time.
///
/// A record with an unreadable timestamp is still delivered; the failure only
/// shows up as a warning.
pub fn parse_timestamp_or_now(value: &str) -> DateTime<Utc> {
    match parse_timestamp(value) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to current time for log record");
            Utc::now()
        }
    }
}
