#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Exposure and impact result types.
//!
//! Exposure counts (e.g. expected travelers per county per day) come from
//! outside the engine. Impact records join them with crossing times, and
//! comparison records diff a baseline run against a shifted what-if run.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use storm_impact_track_models::{Attributes, EXPECTED_TIME_FORMAT};

/// Layout used for exposure and impact dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Exposure count for one region on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureRecord {
    /// Region identifier.
    pub region_id: String,
    /// Calendar day.
    pub date: NaiveDate,
    /// Non-negative count (e.g. expected travelers).
    pub count: u64,
}

/// A crossing matched to the exposure on its impact day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    /// Region identifier.
    pub region_id: String,
    /// Day the region is impacted.
    pub impact_date: NaiveDate,
    /// Expected impact time. In a shifted scenario this is the impact date
    /// combined with the original crossing time of day.
    pub expected_time: NaiveDateTime,
    /// Hours from the track start.
    pub relative_hours: f64,
    /// Days from the track start.
    pub relative_days: f64,
    /// Exposure count matched on `impact_date`.
    pub exposure_count: u64,
    /// Track attributes at the crossing.
    pub attributes: Attributes,
}

impl ImpactRecord {
    /// Expected time as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn expected_time_label(&self) -> String {
        self.expected_time.format(EXPECTED_TIME_FORMAT).to_string()
    }

    /// Numeric attribute from the crossing snapshot.
    #[must_use]
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(serde_json::Value::as_f64)
    }
}

/// Impact totals for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyImpact {
    /// Calendar day.
    pub date: NaiveDate,
    /// Sum of exposure counts impacted on this day.
    pub total: u64,
    /// Number of impact records on this day.
    pub regions: usize,
}

/// One region's share of the total impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionShare {
    /// Region identifier.
    pub region_id: String,
    /// Impacted count for the region.
    pub count: u64,
    /// Percentage of the grand total (0 when the total is 0).
    pub percent: f64,
}

/// Reductions over an impact list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    /// Sum of all exposure counts.
    pub total: u64,
    /// Number of impacted regions.
    pub region_count: usize,
    /// Mean exposure count per impact record (0 when empty).
    pub mean_per_region: f64,
    /// Day with the largest total; earliest day on ties.
    pub peak_day: Option<DailyImpact>,
    /// Per-day totals in ascending date order.
    pub daily: Vec<DailyImpact>,
}

/// Baseline vs. scenario for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    /// Region identifier.
    pub region_id: String,
    /// Baseline impact day, if the region was impacted in the baseline.
    pub baseline_date: Option<NaiveDate>,
    /// Baseline count, 0 when absent.
    pub baseline_count: u64,
    /// Scenario impact day, if the region was impacted in the scenario.
    pub scenario_date: Option<NaiveDate>,
    /// Scenario count, 0 when absent.
    pub scenario_count: u64,
    /// `scenario_count - baseline_count`.
    pub difference: i64,
}

/// Full what-if comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    /// Day the baseline track started.
    pub baseline_start: NaiveDate,
    /// Day the scenario replay starts.
    pub scenario_start: NaiveDate,
    /// Baseline impacts.
    pub baseline: Vec<ImpactRecord>,
    /// Scenario impacts.
    pub scenario: Vec<ImpactRecord>,
    /// Reductions over `baseline`.
    pub baseline_summary: ImpactSummary,
    /// Reductions over `scenario`.
    pub scenario_summary: ImpactSummary,
    /// Per-region outer join, ordered by region id.
    pub records: Vec<ComparisonRecord>,
    /// Sum of baseline counts.
    pub baseline_total: u64,
    /// Sum of scenario counts.
    pub scenario_total: u64,
    /// `scenario_total - baseline_total`.
    pub difference: i64,
    /// `difference / baseline_total * 100`, 0 when `baseline_total` is 0.
    pub percent_change: f64,
}

/// `minuend - subtrahend` as a signed value, saturating at the `i64`
/// bounds.
#[must_use]
pub fn signed_difference(minuend: u64, subtrahend: u64) -> i64 {
    let magnitude = i64::try_from(minuend.abs_diff(subtrahend)).unwrap_or(i64::MAX);
    if minuend >= subtrahend {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_difference_both_directions() {
        assert_eq!(signed_difference(10, 3), 7);
        assert_eq!(signed_difference(3, 10), -7);
        assert_eq!(signed_difference(0, 0), 0);
        assert_eq!(signed_difference(u64::MAX, 0), i64::MAX);
    }

    #[test]
    fn dates_serialize_as_iso_days() {
        let record = ExposureRecord {
            region_id: "12086".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, 3).unwrap(),
            count: 1200,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "regionId": "12086", "date": "2024-08-03", "count": 1200 })
        );
    }
}
