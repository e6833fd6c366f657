#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File loaders for storm tracks, region boundaries, and exposure tables.
//!
//! Loaders are plain functions. Reuse across repeated scenario runs goes
//! through a [`LoaderCache`] owned by the caller; nothing here keeps
//! process-wide state.

pub mod cache;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use storm_impact_impact::ExposureTable;
use storm_impact_impact::exposure::ExposureCsvOptions;
use storm_impact_region::{RegionIndex, RegionIndexOptions};
use storm_impact_track_models::RawTrackSample;
use thiserror::Error;

pub use cache::LoaderCache;

/// Errors that can occur while loading input files.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// I/O failure opening or reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The track document is not valid JSON of the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The region document could not be indexed.
    #[error("Region error: {0}")]
    Region(#[from] storm_impact_region::RegionError),

    /// The exposure table could not be read.
    #[error("Exposure error: {0}")]
    Exposure(#[from] storm_impact_impact::ExposureError),
}

/// Track documents are either a bare array of samples or an envelope with
/// the samples under `records`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TrackDocument {
    Samples(Vec<RawTrackSample>),
    Envelope {
        #[serde(default)]
        meta: Option<serde_json::Value>,
        records: Vec<RawTrackSample>,
    },
}

impl TrackDocument {
    fn into_samples(self) -> Vec<RawTrackSample> {
        match self {
            Self::Samples(samples) => samples,
            Self::Envelope { meta, records } => {
                if let Some(meta) = meta {
                    log::debug!("Track envelope meta: {meta}");
                }
                records
            }
        }
    }
}

/// Parses track samples from a JSON string.
///
/// # Errors
///
/// Returns [`LoaderError::Json`] if the document is neither an array of
/// samples nor a `{ "records": [...] }` envelope.
pub fn parse_track_samples(json: &str) -> Result<Vec<RawTrackSample>, LoaderError> {
    let document: TrackDocument = serde_json::from_str(json)?;
    Ok(document.into_samples())
}

/// Loads track samples from a JSON file.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be read or parsed.
pub fn load_track_samples(path: &Path) -> Result<Vec<RawTrackSample>, LoaderError> {
    let reader = BufReader::new(File::open(path)?);
    let document: TrackDocument = serde_json::from_reader(reader)?;
    let samples = document.into_samples();
    log::info!("Loaded {} track samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Loads and indexes a GeoJSON `FeatureCollection` of region boundaries.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be read or is not a
/// `FeatureCollection`.
pub fn load_regions(path: &Path, options: RegionIndexOptions) -> Result<RegionIndex, LoaderError> {
    let contents = std::fs::read_to_string(path)?;
    let index = RegionIndex::from_geojson_str(&contents, options)?;
    log::info!("Loaded {} regions from {}", index.len(), path.display());
    Ok(index)
}

/// Loads an exposure CSV file.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be opened or the CSV is
/// malformed.
pub fn load_exposure(
    path: &Path,
    options: ExposureCsvOptions,
) -> Result<ExposureTable, LoaderError> {
    let reader = BufReader::new(File::open(path)?);
    let table = ExposureTable::from_csv_reader(reader, options)?;
    log::info!("Loaded {} exposure entries from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use storm_impact_impact::ExposureProvider as _;

    use super::*;

    #[test]
    fn parses_bare_array() {
        let samples = parse_track_samples(
            r#"[{"lat": 25.0, "lon": -70.0, "timestamp": "2024-08-03T00:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].lat, Some(25.0));
    }

    #[test]
    fn parses_envelope() {
        let samples = parse_track_samples(
            r#"{
                "meta": {"source": "forecast"},
                "records": [
                    {"lat": 25.0, "lon": -70.0, "valid_time": "2024-08-03T00:00:00"},
                    {"lat": 26.0, "lon": -71.0}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].timestamp.as_deref(),
            Some("2024-08-03T00:00:00")
        );
        assert!(samples[1].timestamp.is_none());
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(
            parse_track_samples(r#"{"points": []}"#),
            Err(LoaderError::Json(_))
        ));
    }

    #[test]
    fn loads_files_from_disk() {
        let tmp = std::env::temp_dir().join("storm_impact_loader_test_files");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let track_path = tmp.join("track.json");
        std::fs::write(&track_path, r#"[{"lat": 1.0, "lon": 2.0}]"#).unwrap();
        assert_eq!(load_track_samples(&track_path).unwrap().len(), 1);

        let regions_path = tmp.join("regions.geojson");
        std::fs::write(
            &regions_path,
            r#"{"type": "FeatureCollection", "features": [{
                "type": "Feature",
                "id": 1001,
                "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            }]}"#,
        )
        .unwrap();
        let index = load_regions(&regions_path, RegionIndexOptions { pad_fips: true }).unwrap();
        assert!(index.get("01001").is_some());

        let exposure_path = tmp.join("exposure.csv");
        std::fs::write(&exposure_path, "county_fips,date,expected_travelers\n1001,2024-08-03,500\n")
            .unwrap();
        let table = load_exposure(&exposure_path, ExposureCsvOptions { pad_fips: true }).unwrap();
        assert_eq!(
            table.exposure("01001", NaiveDate::from_ymd_opt(2024, 8, 3).unwrap()),
            Some(500)
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("storm_impact_loader_does_not_exist.json");
        assert!(matches!(
            load_track_samples(&path),
            Err(LoaderError::Io(_))
        ));
    }
}
