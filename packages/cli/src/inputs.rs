//! Input files for one CLI invocation, loaded through caches so repeated
//! scenario runs read each file once.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use storm_impact_impact::ExposureTable;
use storm_impact_impact::exposure::ExposureCsvOptions;
use storm_impact_impact::synthetic::SyntheticExposure;
use storm_impact_loader::{LoaderCache, LoaderError, load_exposure, load_regions, load_track_samples};
use storm_impact_region::{RegionIndex, RegionIndexOptions};
use storm_impact_track::Track;
use storm_impact_track::group::group_by_track_id;
use storm_impact_track_models::RawTrackSample;

/// Cached inputs.
#[derive(Debug)]
pub struct Inputs {
    pad_fips: bool,
    samples: LoaderCache<PathBuf, Vec<RawTrackSample>>,
    regions: LoaderCache<PathBuf, RegionIndex>,
    exposure: LoaderCache<PathBuf, ExposureTable>,
    synthetic: LoaderCache<NaiveDate, ExposureTable>,
}

impl Inputs {
    #[must_use]
    pub fn new(pad_fips: bool) -> Self {
        Self {
            pad_fips,
            samples: LoaderCache::new(),
            regions: LoaderCache::new(),
            exposure: LoaderCache::new(),
            synthetic: LoaderCache::new(),
        }
    }

    /// Normalized track from `path`, restricted to `track_id` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or `track_id` does not
    /// occur in it.
    pub fn track(
        &mut self,
        path: &Path,
        track_id: Option<&str>,
    ) -> Result<Track, Box<dyn std::error::Error>> {
        let samples = self
            .samples
            .get_or_try_load(path.to_path_buf(), |p| load_track_samples(p))?;

        let Some(track_id) = track_id else {
            return Ok(Track::normalize(samples));
        };

        let mut grouped = group_by_track_id(samples);
        let selected = grouped
            .remove(track_id)
            .ok_or_else(|| format!("Unknown track id: {track_id}"))?;
        log::info!(
            "Selected track {track_id} ({} samples, {} other tracks in file)",
            selected.len(),
            grouped.len()
        );
        Ok(Track::normalize(&selected))
    }

    /// Region index from a GeoJSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the file cannot be loaded.
    pub fn regions(&mut self, path: &Path) -> Result<&RegionIndex, LoaderError> {
        let options = RegionIndexOptions {
            pad_fips: self.pad_fips,
        };
        self.regions
            .get_or_try_load(path.to_path_buf(), |p| load_regions(p, options))
    }

    /// Exposure table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the file cannot be loaded.
    pub fn exposure(&mut self, path: &Path) -> Result<&ExposureTable, LoaderError> {
        let options = ExposureCsvOptions {
            pad_fips: self.pad_fips,
        };
        self.exposure
            .get_or_try_load(path.to_path_buf(), |p| load_exposure(p, options))
    }

    /// Synthetic exposure for `region_ids` starting at `start`.
    pub fn synthetic(
        &mut self,
        generator: &SyntheticExposure,
        region_ids: &[String],
        start: NaiveDate,
    ) -> &ExposureTable {
        match self
            .synthetic
            .get_or_try_load(start, |day| Ok::<_, Infallible>(generator.generate(region_ids, *day)))
        {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    /// Logs cache effectiveness.
    pub fn log_stats(&self) {
        log::debug!(
            "Input cache: samples {}/{}, regions {}/{}, exposure {}/{}, synthetic {}/{} (hits/misses)",
            self.samples.hits(),
            self.samples.misses(),
            self.regions.hits(),
            self.regions.misses(),
            self.exposure.hits(),
            self.exposure.misses(),
            self.synthetic.hits(),
            self.synthetic.misses(),
        );
    }
}
