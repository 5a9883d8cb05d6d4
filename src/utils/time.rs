use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};

use crate::domain::DomainError;

/// Stored timestamp format: RFC 3339, UTC, second precision (`2026-10-18T20:00:00Z`).
/// Values in this format order correctly as plain strings, which the expiry and
/// "upcoming" filters rely on.
pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now() -> String {
    format(Utc::now())
}

/// Parse a client-supplied RFC 3339 timestamp into the stored format
pub fn normalize(field: &str, raw: &str) -> Result<String, DomainError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| format(ts.with_timezone(&Utc)))
        .map_err(|_| {
            DomainError::Validation(format!(
                "{} must be an RFC 3339 timestamp, e.g. 2026-10-18T20:00:00Z",
                field
            ))
        })
}

/// Parse a stored timestamp; unparsable values read as the epoch
pub fn parse(stored: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(stored)
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Last year the stored format can hold while still sorting as a string
pub const MAX_YEAR: i32 = 9999;

pub fn add_days(from: DateTime<Utc>, days: i32) -> Result<DateTime<Utc>, DomainError> {
    Duration::try_days(i64::from(days))
        .and_then(|delta| from.checked_add_signed(delta))
        .filter(|ts| ts.year() <= MAX_YEAR)
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "{} days from {} is out of range",
                days,
                format(from)
            ))
        })
}
