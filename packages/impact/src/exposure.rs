//! Exposure lookup and ingestion.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{NaiveDate, TimeDelta};
use storm_impact_impact_models::{DATE_FORMAT, ExposureRecord};
use storm_impact_region::fips::pad_county_fips;

use crate::ExposureError;

const REGION_COLUMNS: &[&str] = &["region_id", "county_fips", "fips"];
const DATE_COLUMNS: &[&str] = &["date"];
const COUNT_COLUMNS: &[&str] = &["count", "expected_travelers", "volume"];

/// Source of exposure counts keyed by region and day.
pub trait ExposureProvider {
    /// Count for `region_id` on `date`, or `None` when there is no entry.
    fn exposure(&self, region_id: &str, date: NaiveDate) -> Option<u64>;
}

/// In-memory exposure table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposureTable {
    counts: BTreeMap<(String, NaiveDate), u64>,
}

/// Options for reading exposure CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureCsvOptions {
    /// Left-pad all-digit region ids to five-digit county FIPS codes.
    pub pad_fips: bool,
}

impl ExposureTable {
    /// Builds a table from records. When a `(region, date)` key repeats,
    /// the first count is kept.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ExposureRecord>) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            let key = (record.region_id, record.date);
            if counts.contains_key(&key) {
                log::debug!("Duplicate exposure for {} on {}, keeping the first", key.0, key.1);
                continue;
            }
            counts.insert(key, record.count);
        }
        Self { counts }
    }

    /// Reads `region_id,date,count` CSV.
    ///
    /// `county_fips` / `fips` are accepted for the region column and
    /// `expected_travelers` / `volume` for the count column. Rows that
    /// cannot be decoded, or carry an unparseable date or a negative or
    /// non-numeric count, are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ExposureError`] if the header row cannot be read or a
    /// required column is missing.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        options: ExposureCsvOptions,
    ) -> Result<Self, ExposureError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let region_col = find_column(&headers, REGION_COLUMNS, "region_id")?;
        let date_col = find_column(&headers, DATE_COLUMNS, "date")?;
        let count_col = find_column(&headers, COUNT_COLUMNS, "count")?;

        let mut records = Vec::new();
        let mut dropped = 0_usize;

        for (line, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    log::warn!("Dropping unreadable exposure row {}: {e}", line + 2);
                    dropped += 1;
                    continue;
                }
            };
            let region = row.get(region_col).unwrap_or_default();
            let date = row.get(date_col).unwrap_or_default();
            let count = row.get(count_col).unwrap_or_default();

            let Some(record) = parse_row(region, date, count, options) else {
                log::warn!(
                    "Dropping exposure row {}: region={region:?} date={date:?} count={count:?}",
                    line + 2
                );
                dropped += 1;
                continue;
            };
            records.push(record);
        }

        let table = Self::from_records(records);
        log::info!(
            "Read {} exposure entries ({dropped} rows dropped)",
            table.len()
        );
        Ok(table)
    }

    /// Copy of the table with every date moved by `days`.
    ///
    /// Entries whose date would leave the representable range are dropped.
    #[must_use]
    pub fn shifted(&self, days: i64) -> Self {
        let Some(delta) = TimeDelta::try_days(days) else {
            log::warn!("Exposure shift of {days} days is out of range");
            return Self::default();
        };

        let counts = self
            .counts
            .iter()
            .filter_map(|((region, date), count)| {
                let moved = date.checked_add_signed(delta)?;
                Some(((region.clone(), moved), *count))
            })
            .collect();

        Self { counts }
    }

    /// All entries ordered by region then date.
    #[must_use]
    pub fn records(&self) -> Vec<ExposureRecord> {
        self.counts
            .iter()
            .map(|((region_id, date), count)| ExposureRecord {
                region_id: region_id.clone(),
                date: *date,
                count: *count,
            })
            .collect()
    }

    /// Inserts or replaces a single entry.
    pub fn insert(&mut self, region_id: impl Into<String>, date: NaiveDate, count: u64) {
        self.counts.insert((region_id.into(), date), count);
    }

    /// Number of `(region, date)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl ExposureProvider for ExposureTable {
    fn exposure(&self, region_id: &str, date: NaiveDate) -> Option<u64> {
        self.counts.get(&(region_id.to_string(), date)).copied()
    }
}

impl<F> ExposureProvider for F
where
    F: Fn(&str, NaiveDate) -> Option<u64>,
{
    fn exposure(&self, region_id: &str, date: NaiveDate) -> Option<u64> {
        self(region_id, date)
    }
}

fn find_column(
    headers: &csv::StringRecord,
    candidates: &[&str],
    column: &'static str,
) -> Result<usize, ExposureError> {
    headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.eq_ignore_ascii_case(c)))
        .ok_or(ExposureError::MissingColumn { column })
}

fn parse_row(
    region: &str,
    date: &str,
    count: &str,
    options: ExposureCsvOptions,
) -> Option<ExposureRecord> {
    if region.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let count = parse_count(count)?;
    let region_id = if options.pad_fips {
        pad_county_fips(region)
    } else {
        region.to_string()
    };

    Some(ExposureRecord {
        region_id,
        date,
        count,
    })
}

/// Accepts integers and non-negative finite decimals (truncated).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(raw: &str) -> Option<u64> {
    if let Ok(count) = raw.parse::<u64>() {
        return Some(count);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}
