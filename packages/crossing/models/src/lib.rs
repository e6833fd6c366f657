#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Track-region crossing records.
//!
//! One [`CrossingRecord`] exists per region the track actually reaches,
//! describing the earliest track element that reached it and when.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storm_impact_track_models::{
    Attributes, EXPECTED_TIME_FORMAT, StormCategory, WIND_SPEED_KNOTS,
};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which kind of track element produced a crossing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrossingTrigger {
    /// A track point lies inside or on the region.
    Point,
    /// A segment between two consecutive points meets the region.
    Segment,
}

/// How the crossing time was resolved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeSource {
    /// The triggering point's own timestamp.
    Observed,
    /// Arithmetic midpoint of the segment endpoint timestamps.
    Midpoint,
    /// Derived from the track start and the element index.
    Fallback,
}

/// The earliest crossing of one region by the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingRecord {
    /// Region identifier.
    pub region_id: String,
    /// Index of the triggering point, or of the triggering segment's first
    /// point.
    pub crossing_index: usize,
    /// Point or segment.
    pub trigger: CrossingTrigger,
    /// Resolved crossing instant.
    pub crossing_time: DateTime<Utc>,
    /// How `crossing_time` was obtained.
    pub time_source: TimeSource,
    /// Hours from the track start, rounded to two decimals.
    pub relative_hours: f64,
    /// `relative_hours / 24`, rounded to two decimals.
    pub relative_days: f64,
    /// Latitude of the track point at `crossing_index`.
    pub lat: f64,
    /// Longitude of the track point at `crossing_index`.
    pub lon: f64,
    /// Attributes of the track point at `crossing_index`.
    pub attributes: Attributes,
}

impl CrossingRecord {
    /// Crossing time as `YYYY-MM-DD HH:MM:SS` (UTC).
    #[must_use]
    pub fn expected_time_label(&self) -> String {
        self.crossing_time.format(EXPECTED_TIME_FORMAT).to_string()
    }

    /// Numeric attribute from the snapshot.
    #[must_use]
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Storm category at the crossing, when wind speed was reported.
    #[must_use]
    pub fn category(&self) -> Option<StormCategory> {
        self.attribute_f64(WIND_SPEED_KNOTS)
            .map(StormCategory::from_wind_speed_knots)
    }
}

/// Whole-track figures over a set of crossings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingSummary {
    /// Points in the normalized track.
    pub track_points: usize,
    /// Regions with a crossing.
    pub affected_regions: usize,
    /// UTC date of the earliest crossing.
    pub first_impact: Option<NaiveDate>,
    /// Largest `relative_hours` among the crossings.
    pub total_duration_hours: Option<f64>,
    /// Mean wind speed over crossings that report one.
    pub mean_wind_speed_knots: Option<f64>,
    /// Lowest reported central pressure.
    pub min_pressure_hpa: Option<f64>,
    /// Highest category reached at any crossing.
    pub peak_category: Option<StormCategory>,
}
