//! Timestamp parsing for track samples.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::TrackError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses an ISO 8601 timestamp.
///
/// Strings with a `Z` suffix or a numeric offset are converted to UTC.
/// Strings without any zone designator are taken to already be UTC.
///
/// # Errors
///
/// Returns [`TrackError::Timestamp`] if the string matches none of the
/// accepted layouts.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TrackError> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    // RFC 3339 requires seconds; allow "2024-08-03T00:00Z" and friends.
    let naive_part = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(TrackError::Timestamp {
        value: s.to_string(),
    })
}
