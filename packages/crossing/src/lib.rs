#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Track-region crossing detection.
//!
//! For every region the detector looks for the earliest track element that
//! reaches it. Points are scanned first; only when no point triggers are
//! segments between consecutive points scanned. Each region produces at
//! most one [`CrossingRecord`].
//!
//! Regions are independent of one another, so with the `parallel` feature
//! they are evaluated on the rayon pool. The result is identical to the
//! sequential path.

pub mod summary;
pub mod timing;

use storm_impact_crossing_models::{CrossingRecord, CrossingTrigger, TimeSource};
use storm_impact_region::{PointPolicy, Region, RegionIndex};
use storm_impact_track::Track;

/// Finds region crossings for a track.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingDetector {
    point_policy: PointPolicy,
}

impl CrossingDetector {
    /// Creates a detector with the given boundary policy for point
    /// triggers.
    #[must_use]
    pub const fn new(point_policy: PointPolicy) -> Self {
        Self { point_policy }
    }

    /// Detects crossings and orders them by `relative_hours` ascending.
    ///
    /// Records with equal `relative_hours` keep region index order.
    #[must_use]
    pub fn detect(&self, track: &Track, regions: &RegionIndex) -> Vec<CrossingRecord> {
        let mut records = self.detect_in_index_order(track, regions);
        sort_by_relative_hours(&mut records);
        records
    }

    /// Detects crossings in region index order.
    ///
    /// An empty track or an empty region index yields no records.
    #[must_use]
    pub fn detect_in_index_order(
        &self,
        track: &Track,
        regions: &RegionIndex,
    ) -> Vec<CrossingRecord> {
        let Some((min, max)) = track.bounds() else {
            log::info!("Track has no points, no crossings to detect");
            return vec![];
        };
        if regions.is_empty() {
            log::info!("Region index is empty, no crossings to detect");
            return vec![];
        }

        let candidates = regions.positions_near(min, max);
        log::debug!(
            "{} of {} regions lie near the track",
            candidates.len(),
            regions.len()
        );

        let all = regions.regions();
        let records = self.detect_candidates(track, all, &candidates);

        log::info!(
            "Track crosses {} of {} regions",
            records.len(),
            regions.len()
        );
        records
    }

    #[cfg(not(feature = "parallel"))]
    fn detect_candidates(
        &self,
        track: &Track,
        regions: &[Region],
        candidates: &[usize],
    ) -> Vec<CrossingRecord> {
        candidates
            .iter()
            .filter_map(|&position| self.detect_region(track, &regions[position]))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn detect_candidates(
        &self,
        track: &Track,
        regions: &[Region],
        candidates: &[usize],
    ) -> Vec<CrossingRecord> {
        use rayon::prelude::*;

        candidates
            .par_iter()
            .filter_map(|&position| self.detect_region(track, &regions[position]))
            .collect()
    }

    /// Detects the earliest crossing of a single region.
    #[must_use]
    pub fn detect_region(&self, track: &Track, region: &Region) -> Option<CrossingRecord> {
        let geometry = &region.geometry;
        let start = track.start_time();

        if let Some(index) = track
            .points()
            .iter()
            .position(|p| geometry.touches_point(p.lon, p.lat, self.point_policy))
        {
            let point = &track.points()[index];
            let (crossing_time, time_source) = timing::point_time(start, index, point);
            log::debug!("Region {} reached by point {index}", region.id);
            return Some(build_record(
                region,
                track,
                index,
                CrossingTrigger::Point,
                crossing_time,
                time_source,
            ));
        }

        let segment = track.segments().find(|s| {
            geometry.intersects_segment((s.start.lon, s.start.lat), (s.end.lon, s.end.lat))
        })?;
        let (crossing_time, time_source) = timing::segment_time(start, &segment);
        log::debug!("Region {} reached by segment {}", region.id, segment.index);

        Some(build_record(
            region,
            track,
            segment.index,
            CrossingTrigger::Segment,
            crossing_time,
            time_source,
        ))
    }
}

/// Stable sort by `relative_hours` ascending.
pub fn sort_by_relative_hours(records: &mut [CrossingRecord]) {
    records.sort_by(|a, b| a.relative_hours.total_cmp(&b.relative_hours));
}

fn build_record(
    region: &Region,
    track: &Track,
    index: usize,
    trigger: CrossingTrigger,
    crossing_time: chrono::DateTime<chrono::Utc>,
    time_source: TimeSource,
) -> CrossingRecord {
    let point = &track.points()[index];
    let relative_hours = timing::relative_hours(track.start_time(), crossing_time);

    CrossingRecord {
        region_id: region.id.clone(),
        crossing_index: index,
        trigger,
        crossing_time,
        time_source,
        relative_hours,
        relative_days: timing::relative_days(relative_hours),
        lat: point.lat,
        lon: point.lon,
        attributes: point.attributes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone as _, Utc};
    use geo::{LineString, MultiPolygon, Polygon};
    use storm_impact_region::RegionGeometry;
    use storm_impact_track_models::RawTrackSample;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample(lat: f64, lon: f64, ts: Option<&str>) -> RawTrackSample {
        RawTrackSample {
            lat: Some(lat),
            lon: Some(lon),
            timestamp: ts.map(str::to_string),
            ..RawTrackSample::default()
        }
    }

    fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_lon, min_lat),
                (max_lon, min_lat),
                (max_lon, max_lat),
                (min_lon, max_lat),
                (min_lon, min_lat),
            ]),
            vec![],
        )
    }

    fn region(id: &str, polygon: Polygon<f64>) -> Region {
        Region {
            id: id.to_string(),
            geometry: RegionGeometry::Polygon(polygon),
        }
    }

    fn stationary_track() -> Track {
        Track::normalize_at(
            &[
                sample(25.0, -70.0, Some("2024-08-03T00:00:00Z")),
                sample(25.0, -70.0, Some("2024-08-03T06:00:00Z")),
            ],
            now(),
        )
    }

    fn moving_track() -> Track {
        Track::normalize_at(
            &[
                sample(25.0, -70.0, Some("2024-08-03T00:00:00Z")),
                sample(25.0, -68.0, Some("2024-08-03T06:00:00Z")),
            ],
            now(),
        )
    }

    #[test]
    fn first_point_inside_region() {
        let regions =
            RegionIndex::from_regions(vec![region("RegionA", rect(-71.0, 24.0, -69.0, 26.0))]);

        let records = CrossingDetector::default().detect(&stationary_track(), &regions);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.region_id, "RegionA");
        assert_eq!(record.crossing_index, 0);
        assert_eq!(record.trigger, CrossingTrigger::Point);
        assert_eq!(record.time_source, TimeSource::Observed);
        assert_eq!(
            record.crossing_time,
            Utc.with_ymd_and_hms(2024, 8, 3, 0, 0, 0).unwrap()
        );
        assert!(record.relative_hours.abs() < f64::EPSILON);
        assert!(record.relative_days.abs() < f64::EPSILON);
    }

    #[test]
    fn segment_crossing_uses_midpoint() {
        let regions =
            RegionIndex::from_regions(vec![region("RegionB", rect(-69.2, 24.0, -68.8, 26.0))]);

        let records = CrossingDetector::default().detect(&moving_track(), &regions);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.crossing_index, 0);
        assert_eq!(record.trigger, CrossingTrigger::Segment);
        assert_eq!(record.time_source, TimeSource::Midpoint);
        assert_eq!(
            record.crossing_time,
            Utc.with_ymd_and_hms(2024, 8, 3, 3, 0, 0).unwrap()
        );
        assert!((record.relative_hours - 3.0).abs() < f64::EPSILON);
        assert!((record.relative_days - 0.12).abs() < 1e-9);
    }

    #[test]
    fn no_contact_yields_nothing() {
        let regions =
            RegionIndex::from_regions(vec![region("far", rect(10.0, 10.0, 11.0, 11.0))]);
        assert!(
            CrossingDetector::default()
                .detect(&moving_track(), &regions)
                .is_empty()
        );
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        let regions =
            RegionIndex::from_regions(vec![region("A", rect(-71.0, 24.0, -69.0, 26.0))]);
        let empty_track = Track::normalize_at(&[], now());
        assert!(
            CrossingDetector::default()
                .detect(&empty_track, &regions)
                .is_empty()
        );

        let empty_regions = RegionIndex::from_regions(vec![]);
        assert!(
            CrossingDetector::default()
                .detect(&moving_track(), &empty_regions)
                .is_empty()
        );
    }

    #[test]
    fn earliest_point_wins() {
        let track = Track::normalize_at(
            &[
                sample(0.0, 0.0, Some("2024-08-03T00:00:00Z")),
                sample(5.0, 5.0, Some("2024-08-03T06:00:00Z")),
                sample(5.5, 5.5, Some("2024-08-03T12:00:00Z")),
            ],
            now(),
        );
        let regions = RegionIndex::from_regions(vec![region("R", rect(4.0, 4.0, 6.0, 6.0))]);

        let records = CrossingDetector::default().detect(&track, &regions);
        assert_eq!(records[0].crossing_index, 1);
        assert!((records[0].relative_hours - 6.0).abs() < f64::EPSILON);
        assert!((records[0].relative_days - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn any_point_beats_an_earlier_segment() {
        // Segment 0 passes through the first polygon without either endpoint
        // inside it; point 2 sits inside the second polygon.
        let track = Track::normalize_at(
            &[
                sample(0.0, 0.0, Some("2024-08-03T00:00:00Z")),
                sample(0.0, 10.0, Some("2024-08-03T06:00:00Z")),
                sample(0.0, 20.0, Some("2024-08-03T12:00:00Z")),
            ],
            now(),
        );
        let regions = RegionIndex::from_regions(vec![Region {
            id: "split".to_string(),
            geometry: RegionGeometry::MultiPolygon(MultiPolygon(vec![
                rect(4.0, -1.0, 6.0, 1.0),
                rect(19.0, -1.0, 21.0, 1.0),
            ])),
        }]);

        let records = CrossingDetector::default().detect(&track, &regions);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].crossing_index, 2);
        assert_eq!(records[0].trigger, CrossingTrigger::Point);
    }

    #[test]
    fn boundary_contact_respects_policy() {
        let track = Track::normalize_at(
            &[
                sample(26.0, -70.0, Some("2024-08-03T00:00:00Z")),
                sample(27.0, -70.0, Some("2024-08-03T06:00:00Z")),
            ],
            now(),
        );
        let regions =
            RegionIndex::from_regions(vec![region("edge", rect(-71.0, 24.0, -69.0, 26.0))]);

        let inclusive = CrossingDetector::new(PointPolicy::Inclusive).detect(&track, &regions);
        assert_eq!(inclusive[0].trigger, CrossingTrigger::Point);

        // The segment still touches the boundary, so the region is reached
        // through segment 0 instead.
        let interior = CrossingDetector::new(PointPolicy::Interior).detect(&track, &regions);
        assert_eq!(interior[0].trigger, CrossingTrigger::Segment);
        assert!((interior[0].relative_hours - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_timestamps_use_fallback_table() {
        let track = Track::normalize_at(
            &[
                sample(0.0, 0.0, Some("2024-08-03T00:00:00Z")),
                sample(0.0, 1.0, None),
                sample(0.0, 2.0, None),
                sample(0.0, 10.0, None),
            ],
            now(),
        );
        let regions = RegionIndex::from_regions(vec![
            region("point", rect(1.5, -1.0, 2.5, 1.0)),
            region("segment", rect(5.0, -1.0, 6.0, 1.0)),
        ]);

        let records = CrossingDetector::default().detect(&track, &regions);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region_id, "point");
        assert_eq!(records[0].time_source, TimeSource::Fallback);
        assert!((records[0].relative_hours - 12.0).abs() < f64::EPSILON);

        assert_eq!(records[1].region_id, "segment");
        assert_eq!(records[1].crossing_index, 2);
        assert_eq!(records[1].time_source, TimeSource::Fallback);
        assert!((records[1].relative_hours - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn output_sorted_by_relative_hours_and_bounded_by_regions() {
        let track = Track::normalize_at(
            &[
                sample(0.0, 0.0, Some("2024-08-03T00:00:00Z")),
                sample(0.0, 10.0, Some("2024-08-03T06:00:00Z")),
                sample(0.0, 20.0, Some("2024-08-03T12:00:00Z")),
            ],
            now(),
        );
        let regions = RegionIndex::from_regions(vec![
            region("late", rect(19.0, -1.0, 21.0, 1.0)),
            region("miss", rect(50.0, 50.0, 51.0, 51.0)),
            region("early", rect(-1.0, -1.0, 1.0, 1.0)),
            region("middle", rect(14.0, -1.0, 15.0, 1.0)),
        ]);

        let detector = CrossingDetector::default();
        let records = detector.detect(&track, &regions);

        assert!(records.len() <= regions.len());
        let ids: Vec<&str> = records.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);

        let ordered = detector.detect_in_index_order(&track, &regions);
        let ids: Vec<&str> = ordered.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(ids, vec!["late", "early", "middle"]);

        for record in &records {
            assert!(
                (record.relative_days - timing::round2(record.relative_hours / 24.0)).abs()
                    < f64::EPSILON
            );
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let regions = RegionIndex::from_regions(vec![
            region("a", rect(-69.2, 24.0, -68.8, 26.0)),
            region("b", rect(-71.0, 24.0, -69.0, 26.0)),
        ]);
        let detector = CrossingDetector::default();
        let first = detector.detect(&moving_track(), &regions);
        let second = detector.detect(&moving_track(), &regions);
        assert_eq!(first, second);
    }

    #[test]
    fn snapshot_carries_point_attributes() {
        let mut first = sample(25.0, -70.0, Some("2024-08-03T00:00:00Z"));
        first.attributes.insert(
            "maximum_sustained_wind_speed_knots".to_string(),
            serde_json::json!(100),
        );
        let track = Track::normalize_at(
            &[first, sample(25.0, -68.0, Some("2024-08-03T06:00:00Z"))],
            now(),
        );
        let regions =
            RegionIndex::from_regions(vec![region("seg", rect(-69.2, 24.0, -68.8, 26.0))]);

        let records = CrossingDetector::default().detect(&track, &regions);
        assert_eq!(
            records[0].attributes.get("maximum_sustained_wind_speed_knots"),
            Some(&serde_json::json!(100))
        );
        assert!((records[0].lon - -70.0).abs() < f64::EPSILON);
    }
}
