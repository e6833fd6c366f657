//! Reductions over impact lists.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use storm_impact_impact_models::{DailyImpact, ImpactRecord, ImpactSummary, RegionShare};

/// Sum of all exposure counts.
#[must_use]
pub fn total(impacts: &[ImpactRecord]) -> u64 {
    impacts
        .iter()
        .fold(0_u64, |acc, i| acc.saturating_add(i.exposure_count))
}

/// Per-day totals in ascending date order.
#[must_use]
pub fn daily_totals(impacts: &[ImpactRecord]) -> Vec<DailyImpact> {
    let mut by_day: BTreeMap<NaiveDate, (u64, usize)> = BTreeMap::new();
    for impact in impacts {
        let entry = by_day.entry(impact.impact_date).or_default();
        entry.0 = entry.0.saturating_add(impact.exposure_count);
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (total, regions))| DailyImpact {
            date,
            total,
            regions,
        })
        .collect()
}

/// Per-region totals keyed by region id.
#[must_use]
pub fn region_totals(impacts: &[ImpactRecord]) -> BTreeMap<String, u64> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for impact in impacts {
        let entry = totals.entry(impact.region_id.clone()).or_default();
        *entry = entry.saturating_add(impact.exposure_count);
    }
    totals
}

/// Mean exposure count per impact record, 0 for an empty list.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_per_region(impacts: &[ImpactRecord]) -> f64 {
    if impacts.is_empty() {
        return 0.0;
    }
    total(impacts) as f64 / impacts.len() as f64
}

/// Day with the largest total. The earliest day wins ties.
#[must_use]
pub fn peak_day(daily: &[DailyImpact]) -> Option<DailyImpact> {
    daily
        .iter()
        .fold(None::<&DailyImpact>, |best, day| match best {
            Some(current) if day.total <= current.total => Some(current),
            _ => Some(day),
        })
        .cloned()
}

/// Each region's percentage of the grand total, ordered by region id.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn volume_shares(impacts: &[ImpactRecord]) -> Vec<RegionShare> {
    let grand_total = total(impacts);

    region_totals(impacts)
        .into_iter()
        .map(|(region_id, count)| RegionShare {
            percent: if grand_total == 0 {
                0.0
            } else {
                count as f64 / grand_total as f64 * 100.0
            },
            region_id,
            count,
        })
        .collect()
}

/// Bundles the standard reductions.
#[must_use]
pub fn summarize(impacts: &[ImpactRecord]) -> ImpactSummary {
    let daily = daily_totals(impacts);

    ImpactSummary {
        total: total(impacts),
        region_count: region_totals(impacts).len(),
        mean_per_region: mean_per_region(impacts),
        peak_day: peak_day(&daily),
        daily,
    }
}
