#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storm track normalization.
//!
//! Turns an ordered list of [`RawTrackSample`]s into a [`Track`]: samples
//! without both coordinates are dropped, timestamps are parsed once, and
//! the track start time is resolved. Sample order is preserved exactly as
//! given; nothing here re-sorts by time or geometry.

pub mod group;
pub mod parsing;

use chrono::{DateTime, Utc};
use storm_impact_track_models::{RawTrackSample, TrackPoint};
use thiserror::Error;

pub use parsing::parse_timestamp;

/// Errors that can occur while reading track data.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A timestamp string could not be parsed.
    #[error("Unparseable timestamp: {value:?}")]
    Timestamp {
        /// The rejected input.
        value: String,
    },
}

/// Where [`Track::start_time`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTimeSource {
    /// Timestamp of the first retained point.
    Observed,
    /// The first retained point had no usable timestamp; the clock time at
    /// normalization was used instead.
    Fallback,
}

/// An ordered, normalized storm track.
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<TrackPoint>,
    start_time: DateTime<Utc>,
    start_time_source: StartTimeSource,
}

/// Two consecutive track points.
#[derive(Debug, Clone, Copy)]
pub struct TrackSegment<'a> {
    /// Index of the segment, equal to the index of its first point.
    pub index: usize,
    /// Segment start.
    pub start: &'a TrackPoint,
    /// Segment end.
    pub end: &'a TrackPoint,
}

impl Track {
    /// Normalizes samples using the current clock for the start time
    /// fallback.
    #[must_use]
    pub fn normalize(samples: &[RawTrackSample]) -> Self {
        Self::normalize_at(samples, Utc::now())
    }

    /// Normalizes samples, using `now` when the first retained point has
    /// no usable timestamp.
    #[must_use]
    pub fn normalize_at(samples: &[RawTrackSample], now: DateTime<Utc>) -> Self {
        let mut points = Vec::with_capacity(samples.len());
        let mut dropped = 0_usize;

        for (position, sample) in samples.iter().enumerate() {
            let (Some(lat), Some(lon)) = (sample.lat, sample.lon) else {
                dropped += 1;
                continue;
            };

            let timestamp = sample.timestamp.as_deref().and_then(|raw| {
                parse_timestamp(raw)
                    .map_err(|e| log::warn!("Track sample {position}: {e}"))
                    .ok()
            });

            points.push(TrackPoint {
                lat,
                lon,
                timestamp,
                attributes: sample.attributes.clone(),
            });
        }

        if dropped > 0 {
            log::debug!("Dropped {dropped} track samples without lat/lon");
        }

        let (start_time, start_time_source) = match points.first().and_then(|p| p.timestamp) {
            Some(ts) => (ts, StartTimeSource::Observed),
            None => {
                if !points.is_empty() {
                    log::warn!("First track point has no timestamp, using current time {now}");
                }
                (now, StartTimeSource::Fallback)
            }
        };

        log::info!(
            "Normalized track: {} points retained of {} samples",
            points.len(),
            samples.len()
        );

        Self {
            points,
            start_time,
            start_time_source,
        }
    }

    /// Points in track order.
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Consecutive point pairs in track order.
    pub fn segments(&self) -> impl Iterator<Item = TrackSegment<'_>> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, pair)| TrackSegment {
                index,
                start: &pair[0],
                end: &pair[1],
            })
    }

    /// Start of the track.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Whether [`Self::start_time`] is observed or a fallback.
    #[must_use]
    pub const fn start_time_source(&self) -> StartTimeSource {
        self.start_time_source
    }

    /// Number of retained points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no sample carried both coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the track as `([min_lon, min_lat], [max_lon, max_lat])`.
    #[must_use]
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = self.points.first()?;
        let init = ([first.lon, first.lat], [first.lon, first.lat]);

        Some(self.points.iter().fold(init, |(min, max), p| {
            (
                [min[0].min(p.lon), min[1].min(p.lat)],
                [max[0].max(p.lon), max[1].max(p.lat)],
            )
        }))
    }
}
