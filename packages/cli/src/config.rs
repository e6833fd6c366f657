//! Analysis configuration loaded from TOML.
//!
//! The built-in defaults live in `config/default.toml` and are embedded at
//! compile time. A user file given with `--config` replaces them; keys it
//! leaves out fall back to the same defaults.

use std::path::Path;

use serde::Deserialize;
use storm_impact_impact::synthetic::SyntheticExposure;
use storm_impact_region::PointPolicy;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or has a bad value.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level analysis settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Boundary handling for point crossings.
    pub point_policy: PointPolicy,
    /// Exposure ingestion and synthesis.
    pub exposure: ExposureConfig,
    /// Scenario comparison settings.
    pub scenario: ScenarioConfig,
}

/// Exposure settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Parameters for the synthetic generator.
    #[serde(flatten)]
    pub synthetic: SyntheticExposure,
    /// Left-pad all-digit region ids to five-digit county FIPS codes, in
    /// both boundaries and exposure files.
    #[serde(default = "default_true")]
    pub pad_fips: bool,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            synthetic: SyntheticExposure::default(),
            pad_fips: true,
        }
    }
}

/// Scenario settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Where scenario exposure comes from.
    pub exposure: ScenarioExposureMode,
}

/// Source of exposure for scenario runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioExposureMode {
    /// Shift the baseline table onto the scenario dates.
    #[default]
    Shifted,
    /// Generate a synthetic table for the scenario window.
    Synthetic,
}

const fn default_true() -> bool {
    true
}

impl AnalysisConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Loads `path`, or the embedded defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::from_toml_str(DEFAULT_CONFIG);
        };

        log::debug!("Loading config from {}", path.display());
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }
}
