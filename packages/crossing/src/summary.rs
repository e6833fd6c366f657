//! Whole-track figures over detected crossings.

use storm_impact_crossing_models::{CrossingRecord, CrossingSummary};
use storm_impact_track_models::{PRESSURE_HPA, WIND_SPEED_KNOTS};

/// Reduces `records` to a [`CrossingSummary`].
///
/// Wind and pressure figures only consider crossings that report them.
/// Every optional field is `None` when nothing contributes to it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[CrossingRecord], track_points: usize) -> CrossingSummary {
    let winds: Vec<f64> = records
        .iter()
        .filter_map(|r| r.attribute_f64(WIND_SPEED_KNOTS))
        .collect();

    CrossingSummary {
        track_points,
        affected_regions: records.len(),
        first_impact: records
            .iter()
            .map(|r| r.crossing_time)
            .min()
            .map(|t| t.date_naive()),
        total_duration_hours: records
            .iter()
            .map(|r| r.relative_hours)
            .max_by(f64::total_cmp),
        mean_wind_speed_knots: (!winds.is_empty())
            .then(|| winds.iter().sum::<f64>() / winds.len() as f64),
        min_pressure_hpa: records
            .iter()
            .filter_map(|r| r.attribute_f64(PRESSURE_HPA))
            .min_by(f64::total_cmp),
        peak_category: records.iter().filter_map(CrossingRecord::category).max(),
    }
}
