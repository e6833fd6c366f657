//! JSON and CSV rendering of analysis results.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use storm_impact_crossing_models::{
    CrossingRecord, CrossingSummary, CrossingTrigger, TimeSource,
};
use storm_impact_impact::aggregate;
use storm_impact_impact_models::{
    DATE_FORMAT, ImpactRecord, ImpactSummary, RegionShare, ScenarioComparison,
};
use storm_impact_track_models::{
    Attributes, PRESSURE_HPA, RADIUS_34_KNOT_NE_KM, StormCategory, WIND_SPEED_KNOTS,
};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors that can occur while writing results.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Writing to the output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Storm attributes pulled out of the attribute bag for CSV columns.
struct StormColumns {
    wind_speed_knots: Option<f64>,
    pressure_hpa: Option<f64>,
    radius_34_knot_ne_km: Option<f64>,
    category: Option<&'static str>,
}

impl StormColumns {
    fn from_attributes(attributes: &Attributes) -> Self {
        let number = |key: &str| attributes.get(key).and_then(serde_json::Value::as_f64);
        let wind = number(WIND_SPEED_KNOTS);
        Self {
            wind_speed_knots: wind,
            pressure_hpa: number(PRESSURE_HPA),
            radius_34_knot_ne_km: number(RADIUS_34_KNOT_NE_KM),
            category: wind.map(|w| StormCategory::from_wind_speed_knots(w).label()),
        }
    }
}

#[derive(Serialize)]
struct CrossingRow<'a> {
    region_id: &'a str,
    crossing_index: usize,
    trigger: CrossingTrigger,
    time_source: TimeSource,
    expected_time: String,
    relative_hours: f64,
    relative_days: f64,
    lat: f64,
    lon: f64,
    wind_speed_knots: Option<f64>,
    pressure_hpa: Option<f64>,
    radius_34_knot_ne_km: Option<f64>,
    category: Option<&'static str>,
}

#[derive(Serialize)]
struct ImpactRow<'a> {
    region_id: &'a str,
    impact_date: String,
    expected_time: String,
    relative_hours: f64,
    relative_days: f64,
    exposure_count: u64,
    wind_speed_knots: Option<f64>,
    pressure_hpa: Option<f64>,
    radius_34_knot_ne_km: Option<f64>,
    category: Option<&'static str>,
}

#[derive(Serialize)]
struct ComparisonRow<'a> {
    scenario_start: NaiveDate,
    region_id: &'a str,
    baseline_date: Option<NaiveDate>,
    baseline_count: u64,
    scenario_date: Option<NaiveDate>,
    scenario_count: u64,
    difference: i64,
}

#[derive(Serialize)]
struct CrossingReport<'a> {
    crossings: &'a [CrossingRecord],
    summary: &'a CrossingSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImpactReport<'a> {
    impacts: &'a [ImpactRecord],
    summary: ImpactSummary,
    shares: Vec<RegionShare>,
}

/// Writes crossing records. JSON output also carries the track summary.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or the write fails.
pub fn write_crossings<W: Write>(
    writer: W,
    records: &[CrossingRecord],
    summary: &CrossingSummary,
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(
            writer,
            &CrossingReport {
                crossings: records,
                summary,
            },
        ),
        OutputFormat::Csv => write_csv(writer, records.iter().map(crossing_row)),
    }
}

/// Writes impact records. JSON output also carries the summary and the
/// per-region volume shares.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or the write fails.
pub fn write_impacts<W: Write>(
    writer: W,
    impacts: &[ImpactRecord],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(
            writer,
            &ImpactReport {
                impacts,
                summary: aggregate::summarize(impacts),
                shares: aggregate::volume_shares(impacts),
            },
        ),
        OutputFormat::Csv => write_csv(writer, impacts.iter().map(impact_row)),
    }
}

/// Writes one or more scenario comparisons. CSV output has one row per
/// region per scenario start.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or the write fails.
pub fn write_comparisons<W: Write>(
    writer: W,
    comparisons: &[ScenarioComparison],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(writer, &comparisons),
        OutputFormat::Csv => write_csv(
            writer,
            comparisons.iter().flat_map(|c| {
                c.records.iter().map(|r| ComparisonRow {
                    scenario_start: c.scenario_start,
                    region_id: &r.region_id,
                    baseline_date: r.baseline_date,
                    baseline_count: r.baseline_count,
                    scenario_date: r.scenario_date,
                    scenario_count: r.scenario_count,
                    difference: r.difference,
                })
            }),
        ),
    }
}

fn crossing_row(record: &CrossingRecord) -> CrossingRow<'_> {
    let storm = StormColumns::from_attributes(&record.attributes);
    CrossingRow {
        region_id: &record.region_id,
        crossing_index: record.crossing_index,
        trigger: record.trigger,
        time_source: record.time_source,
        expected_time: record.expected_time_label(),
        relative_hours: record.relative_hours,
        relative_days: record.relative_days,
        lat: record.lat,
        lon: record.lon,
        wind_speed_knots: storm.wind_speed_knots,
        pressure_hpa: storm.pressure_hpa,
        radius_34_knot_ne_km: storm.radius_34_knot_ne_km,
        category: storm.category,
    }
}

fn impact_row(impact: &ImpactRecord) -> ImpactRow<'_> {
    let storm = StormColumns::from_attributes(&impact.attributes);
    ImpactRow {
        region_id: &impact.region_id,
        impact_date: impact.impact_date.format(DATE_FORMAT).to_string(),
        expected_time: impact.expected_time_label(),
        relative_hours: impact.relative_hours,
        relative_days: impact.relative_days,
        exposure_count: impact.exposure_count,
        wind_speed_knots: storm.wind_speed_knots,
        pressure_hpa: storm.pressure_hpa,
        radius_34_knot_ne_km: storm.radius_34_knot_ne_km,
        category: storm.category,
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn write_csv<W: Write, T: Serialize>(
    writer: W,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
