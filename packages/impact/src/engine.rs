//! Crossing-to-exposure join.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use storm_impact_crossing_models::CrossingRecord;
use storm_impact_impact_models::ImpactRecord;

use crate::ExposureProvider;

/// Joins crossings with exposure counts.
///
/// Without `scenario_start` each crossing is matched on the calendar day of
/// its crossing time. With `scenario_start` the impact day is
/// `scenario_start + round(relative_days)` and the expected time keeps the
/// original time of day on that new date. Half a day rounds up, so a
/// crossing 12 hours after the start lands on the following day even when
/// `scenario_start` is the observed start date.
///
/// Crossings with no exposure entry on their impact day produce no record.
/// The result is ordered by `relative_hours` ascending.
#[must_use]
pub fn compute_impacts<P: ExposureProvider + ?Sized>(
    crossings: &[CrossingRecord],
    exposure: &P,
    scenario_start: Option<NaiveDate>,
) -> Vec<ImpactRecord> {
    let mut impacts = Vec::with_capacity(crossings.len());

    for crossing in crossings {
        let Some((impact_date, expected_time)) = impact_timing(crossing, scenario_start) else {
            log::warn!(
                "Impact date for region {} is out of range, skipping",
                crossing.region_id
            );
            continue;
        };

        let Some(exposure_count) = exposure.exposure(&crossing.region_id, impact_date) else {
            log::debug!(
                "No exposure for region {} on {impact_date}",
                crossing.region_id
            );
            continue;
        };

        impacts.push(ImpactRecord {
            region_id: crossing.region_id.clone(),
            impact_date,
            expected_time,
            relative_hours: crossing.relative_hours,
            relative_days: crossing.relative_days,
            exposure_count,
            attributes: crossing.attributes.clone(),
        });
    }

    impacts.sort_by(|a, b| a.relative_hours.total_cmp(&b.relative_hours));

    log::info!(
        "Matched exposure for {} of {} crossings{}",
        impacts.len(),
        crossings.len(),
        scenario_start.map_or_else(String::new, |d| format!(" (scenario start {d})"))
    );

    impacts
}

/// Impact day and expected time for a crossing.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn impact_timing(
    crossing: &CrossingRecord,
    scenario_start: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDateTime)> {
    let Some(start) = scenario_start else {
        let naive = crossing.crossing_time.naive_utc();
        return Some((naive.date(), naive));
    };

    let rounded = crossing.relative_days.round();
    if !rounded.is_finite() {
        return None;
    }
    let days = TimeDelta::try_days(rounded as i64)?;
    let impact_date = start.checked_add_signed(days)?;

    Some((
        impact_date,
        impact_date.and_time(crossing.crossing_time.time()),
    ))
}
