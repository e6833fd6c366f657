#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storm track types.
//!
//! A storm track arrives as a loosely-typed list of forecast samples
//! ([`RawTrackSample`]). Normalization turns the samples that carry a
//! position into [`TrackPoint`]s, which is what every downstream stage
//! works with.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Open attribute bag carried verbatim from a sample to downstream records.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Layout of expected-time labels on crossing and impact records
/// (`YYYY-MM-DD HH:MM:SS`, UTC).
pub const EXPECTED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Attribute key for maximum sustained wind speed in knots.
pub const WIND_SPEED_KNOTS: &str = "maximum_sustained_wind_speed_knots";

/// Attribute key for minimum sea level pressure in hPa.
pub const PRESSURE_HPA: &str = "minimum_sea_level_pressure_hpa";

/// Attribute key for the north-east 34 knot wind radius in km.
pub const RADIUS_34_KNOT_NE_KM: &str = "radius_34_knot_winds_ne_km";

/// A single track sample as received from the track source.
///
/// `lat` and `lon` are optional so that a missing coordinate stays
/// distinguishable from a legitimate `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrackSample {
    /// Latitude in degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub lon: Option<f64>,
    /// ISO 8601 timestamp, optionally suffixed with `Z`.
    #[serde(default, alias = "valid_time")]
    pub timestamp: Option<String>,
    /// Storm identifier (e.g. `"AL042024"`) when the feed mixes storms.
    #[serde(default)]
    pub track_id: Option<String>,
    /// Every other field of the sample.
    #[serde(flatten)]
    pub attributes: Attributes,
}

/// A normalized track position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Parsed timestamp, `None` when absent or unparseable.
    pub timestamp: Option<DateTime<Utc>>,
    /// Attributes carried through unchanged.
    pub attributes: Attributes,
}

impl TrackPoint {
    /// Reads a numeric attribute.
    ///
    /// Returns `None` when the key is absent or not a number.
    #[must_use]
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Maximum sustained wind speed in knots, if reported.
    #[must_use]
    pub fn wind_speed_knots(&self) -> Option<f64> {
        self.attribute_f64(WIND_SPEED_KNOTS)
    }

    /// Saffir-Simpson category derived from the reported wind speed.
    #[must_use]
    pub fn category(&self) -> Option<StormCategory> {
        self.wind_speed_knots()
            .map(StormCategory::from_wind_speed_knots)
    }
}

/// Saffir-Simpson classification of a tropical cyclone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StormCategory {
    /// Sustained winds below 34 knots
    TropicalDepression,
    /// 34 to 63 knots
    TropicalStorm,
    /// 64 to 82 knots
    Category1,
    /// 83 to 95 knots
    Category2,
    /// 96 to 112 knots
    Category3,
    /// 113 to 136 knots
    Category4,
    /// 137 knots and above
    Category5,
}

impl StormCategory {
    /// Classifies a maximum sustained wind speed in knots.
    #[must_use]
    pub fn from_wind_speed_knots(knots: f64) -> Self {
        if knots < 34.0 {
            Self::TropicalDepression
        } else if knots < 64.0 {
            Self::TropicalStorm
        } else if knots < 83.0 {
            Self::Category1
        } else if knots < 96.0 {
            Self::Category2
        } else if knots < 113.0 {
            Self::Category3
        } else if knots < 137.0 {
            Self::Category4
        } else {
            Self::Category5
        }
    }

    /// Human-readable label (e.g. "Tropical Storm", "Category 3").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TropicalDepression => "Tropical Depression",
            Self::TropicalStorm => "Tropical Storm",
            Self::Category1 => "Category 1",
            Self::Category2 => "Category 2",
            Self::Category3 => "Category 3",
            Self::Category4 => "Category 4",
            Self::Category5 => "Category 5",
        }
    }
}
