#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Exposure impact engine.
//!
//! Joins crossing records with per-region, per-day exposure counts to say
//! how many people (or trips, or shipments) a storm reaches, and replays
//! the same crossings against a shifted timeline to answer "what if the
//! storm had arrived on another date".

pub mod aggregate;
pub mod engine;
pub mod exposure;
pub mod scenario;
pub mod synthetic;

#[cfg(test)]
mod test_support;

use thiserror::Error;

pub use engine::compute_impacts;
pub use exposure::{ExposureProvider, ExposureTable};
pub use scenario::{ScenarioComparator, ScenarioExposure};

/// Errors that can occur while reading exposure data.
#[derive(Debug, Error)]
pub enum ExposureError {
    /// I/O failure reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV document could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the header row.
    #[error("Missing exposure column: {column}")]
    MissingColumn {
        /// Name of the expected column.
        column: &'static str,
    },
}
