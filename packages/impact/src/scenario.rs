//! Baseline vs. what-if comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use storm_impact_crossing_models::CrossingRecord;
use storm_impact_impact_models::{
    ComparisonRecord, ImpactRecord, ScenarioComparison, signed_difference,
};

use crate::{ExposureTable, aggregate, compute_impacts};

/// Exposure used for the scenario run.
#[derive(Debug, Clone)]
pub enum ScenarioExposure {
    /// The baseline table with every date moved by
    /// `scenario_start - baseline_start`.
    Shifted,
    /// A separately supplied table covering the scenario window.
    Supplied(ExposureTable),
}

/// Replays one set of crossings against a baseline and a shifted timeline.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioComparator<'a> {
    crossings: &'a [CrossingRecord],
    baseline_exposure: &'a ExposureTable,
    baseline_start: NaiveDate,
}

impl<'a> ScenarioComparator<'a> {
    /// `baseline_start` is the calendar day the observed track started.
    #[must_use]
    pub const fn new(
        crossings: &'a [CrossingRecord],
        baseline_exposure: &'a ExposureTable,
        baseline_start: NaiveDate,
    ) -> Self {
        Self {
            crossings,
            baseline_exposure,
            baseline_start,
        }
    }

    /// Runs the baseline and the scenario starting at `scenario_start` and
    /// diffs them per region.
    #[must_use]
    pub fn compare(
        &self,
        scenario_start: NaiveDate,
        scenario_exposure: &ScenarioExposure,
    ) -> ScenarioComparison {
        let baseline = compute_impacts(self.crossings, self.baseline_exposure, None);

        let scenario = match scenario_exposure {
            ScenarioExposure::Shifted => {
                let shift = (scenario_start - self.baseline_start).num_days();
                log::debug!("Shifting baseline exposure by {shift} days");
                let shifted = self.baseline_exposure.shifted(shift);
                compute_impacts(self.crossings, &shifted, Some(scenario_start))
            }
            ScenarioExposure::Supplied(table) => {
                compute_impacts(self.crossings, table, Some(scenario_start))
            }
        };

        let baseline_total = aggregate::total(&baseline);
        let scenario_total = aggregate::total(&scenario);
        let difference = signed_difference(scenario_total, baseline_total);

        log::info!(
            "Scenario {scenario_start}: baseline {baseline_total}, scenario {scenario_total}, difference {difference:+}"
        );

        ScenarioComparison {
            baseline_start: self.baseline_start,
            scenario_start,
            baseline_summary: aggregate::summarize(&baseline),
            scenario_summary: aggregate::summarize(&scenario),
            records: outer_join(&baseline, &scenario),
            baseline_total,
            scenario_total,
            difference,
            percent_change: percent_change(difference, baseline_total),
            baseline,
            scenario,
        }
    }
}

/// `difference / baseline_total * 100`, or 0 when `baseline_total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_change(difference: i64, baseline_total: u64) -> f64 {
    if baseline_total == 0 {
        return 0.0;
    }
    difference as f64 / baseline_total as f64 * 100.0
}

/// Outer join on region id. A missing side counts as 0. Ordered by region
/// id.
#[must_use]
pub fn outer_join(baseline: &[ImpactRecord], scenario: &[ImpactRecord]) -> Vec<ComparisonRecord> {
    let mut joined: BTreeMap<&str, (Option<&ImpactRecord>, Option<&ImpactRecord>)> =
        BTreeMap::new();

    for record in baseline {
        let entry = joined.entry(record.region_id.as_str()).or_default();
        entry.0.get_or_insert(record);
    }
    for record in scenario {
        let entry = joined.entry(record.region_id.as_str()).or_default();
        entry.1.get_or_insert(record);
    }

    joined
        .into_iter()
        .map(|(region_id, (base, what_if))| {
            let baseline_count = base.map_or(0, |r| r.exposure_count);
            let scenario_count = what_if.map_or(0, |r| r.exposure_count);
            ComparisonRecord {
                region_id: region_id.to_string(),
                baseline_date: base.map(|r| r.impact_date),
                baseline_count,
                scenario_date: what_if.map(|r| r.impact_date),
                scenario_count,
                difference: signed_difference(scenario_count, baseline_count),
            }
        })
        .collect()
}
