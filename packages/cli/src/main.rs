#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for storm track crossing and impact analysis.

mod config;
mod inputs;
mod output;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use storm_impact_crossing::CrossingDetector;
use storm_impact_crossing::summary::summarize;
use storm_impact_crossing_models::CrossingRecord;
use storm_impact_impact::{
    ExposureTable, ScenarioComparator, ScenarioExposure, compute_impacts,
};
use storm_impact_region::PointPolicy;
use storm_impact_track::StartTimeSource;

use crate::config::{AnalysisConfig, ScenarioExposureMode};
use crate::inputs::Inputs;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "storm_impact",
    about = "Storm track region crossing and exposure impact analysis"
)]
struct Cli {
    /// TOML config file (defaults are built in)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format: `json` or `csv`
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TrackArgs {
    /// Track samples: a JSON array, or an object with a `records` array
    #[arg(long)]
    track: PathBuf,
    /// GeoJSON `FeatureCollection` of region boundaries
    #[arg(long)]
    regions: PathBuf,
    /// Only use samples with this `track_id` (e.g. `AL042024`)
    #[arg(long)]
    track_id: Option<String>,
    /// Count only strict interior points as point crossings
    #[arg(long)]
    interior: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the regions the track crosses, earliest first
    Crossings {
        #[command(flatten)]
        track: TrackArgs,
    },
    /// Join crossings with per-region daily exposure
    Impact {
        #[command(flatten)]
        track: TrackArgs,
        /// Exposure CSV (`region_id,date,count`). Synthetic exposure is
        /// generated when omitted.
        #[arg(long)]
        exposure: Option<PathBuf>,
        /// Seed for synthetic exposure (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare the observed timeline with the storm arriving on other dates
    Scenario {
        #[command(flatten)]
        track: TrackArgs,
        /// Exposure CSV (`region_id,date,count`). Synthetic exposure is
        /// generated when omitted.
        #[arg(long)]
        exposure: Option<PathBuf>,
        /// Seed for synthetic exposure (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
        /// Hypothetical start date (YYYY-MM-DD). May be repeated.
        #[arg(long = "scenario-start", required = true)]
        scenario_starts: Vec<NaiveDate>,
    },
}

struct Detected {
    crossings: Vec<CrossingRecord>,
    track_points: usize,
    region_ids: Vec<String>,
    start_date: NaiveDate,
}

fn detect(
    inputs: &mut Inputs,
    config: &AnalysisConfig,
    args: &TrackArgs,
) -> Result<Detected, Box<dyn std::error::Error>> {
    let track = inputs.track(&args.track, args.track_id.as_deref())?;
    if track.start_time_source() == StartTimeSource::Fallback {
        log::warn!("Track has no usable start time, using the current time");
    }

    let regions = inputs.regions(&args.regions)?;
    let policy = if args.interior {
        PointPolicy::Interior
    } else {
        config.point_policy
    };

    let crossings = CrossingDetector::new(policy).detect(&track, regions);
    log::info!(
        "{} of {} regions crossed by a {}-point track",
        crossings.len(),
        regions.len(),
        track.len()
    );

    Ok(Detected {
        region_ids: crossings.iter().map(|c| c.region_id.clone()).collect(),
        crossings,
        track_points: track.len(),
        start_date: track.start_time().date_naive(),
    })
}

fn baseline_exposure<'a>(
    inputs: &'a mut Inputs,
    config: &AnalysisConfig,
    exposure: Option<&Path>,
    detected: &Detected,
) -> Result<&'a ExposureTable, Box<dyn std::error::Error>> {
    if let Some(path) = exposure {
        return Ok(inputs.exposure(path)?);
    }

    log::info!(
        "No exposure file given, generating {} days of synthetic exposure from {}",
        config.exposure.synthetic.days,
        detected.start_date
    );
    Ok(inputs.synthetic(
        &config.exposure.synthetic,
        &detected.region_ids,
        detected.start_date,
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = AnalysisConfig::load(cli.config.as_deref())?;
    let mut inputs = Inputs::new(config.exposure.pad_fips);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Crossings { track } => {
            let detected = detect(&mut inputs, &config, &track)?;
            let summary = summarize(&detected.crossings, detected.track_points);
            output::write_crossings(&mut out, &detected.crossings, &summary, cli.format)?;
        }
        Commands::Impact {
            track,
            exposure,
            seed,
        } => {
            if let Some(seed) = seed {
                config.exposure.synthetic.seed = seed;
            }
            let detected = detect(&mut inputs, &config, &track)?;
            let table = baseline_exposure(&mut inputs, &config, exposure.as_deref(), &detected)?;
            let impacts = compute_impacts(&detected.crossings, table, None);
            output::write_impacts(&mut out, &impacts, cli.format)?;
        }
        Commands::Scenario {
            track,
            exposure,
            seed,
            scenario_starts,
        } => {
            if let Some(seed) = seed {
                config.exposure.synthetic.seed = seed;
            }
            let detected = detect(&mut inputs, &config, &track)?;
            let baseline =
                baseline_exposure(&mut inputs, &config, exposure.as_deref(), &detected)?.clone();

            let mut comparisons = Vec::with_capacity(scenario_starts.len());
            for scenario_start in scenario_starts {
                let scenario_exposure = match config.scenario.exposure {
                    ScenarioExposureMode::Shifted => ScenarioExposure::Shifted,
                    ScenarioExposureMode::Synthetic => ScenarioExposure::Supplied(
                        inputs
                            .synthetic(
                                &config.exposure.synthetic,
                                &detected.region_ids,
                                scenario_start,
                            )
                            .clone(),
                    ),
                };

                let comparator =
                    ScenarioComparator::new(&detected.crossings, &baseline, detected.start_date);
                comparisons.push(comparator.compare(scenario_start, &scenario_exposure));
            }

            output::write_comparisons(&mut out, &comparisons, cli.format)?;
        }
    }

    out.flush()?;
    inputs.log_stats();
    Ok(())
}
