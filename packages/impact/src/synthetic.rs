//! Seeded synthetic exposure generator for demos and what-if windows.

use chrono::{NaiveDate, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use serde::Deserialize;

use crate::ExposureTable;

/// Parameters for [`SyntheticExposure::generate`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyntheticExposure {
    /// Number of consecutive days to generate.
    pub days: u32,
    /// Lower bound of the per-region base count.
    pub base_min: u64,
    /// Upper bound (inclusive) of the per-region base count.
    pub base_max: u64,
    /// Daily multiplicative variation, e.g. `0.2` for +/-20%.
    pub daily_variation: f64,
    /// RNG seed; equal seeds give equal tables.
    pub seed: u64,
}

impl Default for SyntheticExposure {
    fn default() -> Self {
        Self {
            days: 7,
            base_min: 1_000,
            base_max: 50_000,
            daily_variation: 0.2,
            seed: 42,
        }
    }
}

impl SyntheticExposure {
    /// Generates `days` days of counts for each region starting at `start`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn generate(&self, region_ids: &[String], start: NaiveDate) -> ExposureTable {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let (low, high) = if self.base_min <= self.base_max {
            (self.base_min, self.base_max)
        } else {
            (self.base_max, self.base_min)
        };
        let variation = self.daily_variation.clamp(0.0, 1.0);

        let mut table = ExposureTable::default();

        for region_id in region_ids {
            let base = rng.random_range(low..=high);

            for offset in 0..self.days {
                let Some(date) = start.checked_add_signed(TimeDelta::days(i64::from(offset)))
                else {
                    break;
                };
                let factor = if variation > 0.0 {
                    rng.random_range((1.0 - variation)..(1.0 + variation))
                } else {
                    1.0
                };
                let count = (base as f64 * factor) as u64;
                table.insert(region_id.clone(), date, count);
            }
        }

        log::debug!(
            "Generated synthetic exposure for {} regions over {} days from {start}",
            region_ids.len(),
            self.days
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use crate::ExposureProvider as _;

    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 3).unwrap()
    }

    fn ids() -> Vec<String> {
        vec!["01001".to_string(), "01003".to_string()]
    }

    #[test]
    fn covers_every_region_and_day() {
        let table = SyntheticExposure::default().generate(&ids(), start());
        assert_eq!(table.len(), 14);

        for record in table.records() {
            assert!(record.count >= 800, "count {} below range", record.count);
            assert!(record.count <= 60_000, "count {} above range", record.count);
        }
    }

    #[test]
    fn same_seed_same_table() {
        let generator = SyntheticExposure::default();
        assert_eq!(
            generator.generate(&ids(), start()),
            generator.generate(&ids(), start())
        );
    }

    #[test]
    fn zero_variation_is_flat() {
        let generator = SyntheticExposure {
            daily_variation: 0.0,
            days: 3,
            ..SyntheticExposure::default()
        };
        let table = generator.generate(&ids(), start());
        let first = table.exposure("01001", start()).unwrap();
        let last = table
            .exposure("01001", start() + TimeDelta::days(2))
            .unwrap();
        assert_eq!(first, last);
    }
}
