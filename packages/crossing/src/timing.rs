//! Crossing time resolution.
//!
//! | Trigger | Timestamps available | Crossing time |
//! |---|---|---|
//! | point `i` | point `i` | that timestamp |
//! | point `i` | none | `start + 6h * i` |
//! | segment `i` | points `i` and `i + 1` | midpoint of the two |
//! | segment `i` | either missing | `start + 6h * i + 3h` |
//!
//! The segment midpoint is fixed regardless of where along the segment
//! the region boundary actually lies.

use chrono::{DateTime, TimeDelta, Utc};
use storm_impact_crossing_models::TimeSource;
use storm_impact_track::TrackSegment;
use storm_impact_track_models::TrackPoint;

/// Assumed spacing between consecutive track points when timestamps are
/// missing.
pub const FALLBACK_STEP_HOURS: i64 = 6;

/// Offset of a segment's fallback time from its first point.
pub const SEGMENT_OFFSET_HOURS: i64 = FALLBACK_STEP_HOURS / 2;

/// Crossing time for a triggering point at `index`.
#[must_use]
pub fn point_time(
    start: DateTime<Utc>,
    index: usize,
    point: &TrackPoint,
) -> (DateTime<Utc>, TimeSource) {
    point.timestamp.map_or_else(
        || (offset(start, fallback_hours(index, 0)), TimeSource::Fallback),
        |ts| (ts, TimeSource::Observed),
    )
}

/// Crossing time for a triggering segment.
#[must_use]
pub fn segment_time(start: DateTime<Utc>, segment: &TrackSegment<'_>) -> (DateTime<Utc>, TimeSource) {
    match (segment.start.timestamp, segment.end.timestamp) {
        (Some(from), Some(to)) => (from + (to - from) / 2, TimeSource::Midpoint),
        _ => (
            offset(start, fallback_hours(segment.index, SEGMENT_OFFSET_HOURS)),
            TimeSource::Fallback,
        ),
    }
}

/// Hours elapsed from `start` to `at`, rounded to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn relative_hours(start: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    let elapsed = at - start;
    let seconds = elapsed.num_seconds() as f64 + f64::from(elapsed.subsec_nanos()) / 1e9;
    round2(seconds / 3600.0)
}

/// Days corresponding to already-rounded `relative_hours`, rounded to two
/// decimals.
#[must_use]
pub fn relative_days(relative_hours: f64) -> f64 {
    round2(relative_hours / 24.0)
}

/// Rounds to two decimal places.
///
/// Rounding is done on the exact binary value with ties to even, so
/// `0.125` becomes `0.12` and `0.625` becomes `0.62`.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

fn fallback_hours(index: usize, extra: i64) -> i64 {
    i64::try_from(index)
        .unwrap_or(i64::MAX)
        .saturating_mul(FALLBACK_STEP_HOURS)
        .saturating_add(extra)
}

fn offset(start: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    TimeDelta::try_hours(hours)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or_else(|| {
            log::warn!("Fallback offset of {hours}h is out of range, using track start");
            start
        })
}
