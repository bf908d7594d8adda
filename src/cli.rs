//! Command-line interface parsing for covidplot
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `PipelineConfig`. Every flag defaults to the values the charts
//! were originally drawn with.

use chrono::Duration;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use thiserror::Error;

use crate::analysis::AnalysisOptions;
use crate::data::population::DEFAULT_POPULATION_PATH;

/// Countries charted when `--country` is not given
pub const DEFAULT_COUNTRIES: [&str; 7] = [
    "Chile",
    "Germany",
    "Spain",
    "Brazil",
    "US",
    "Italy",
    "United Kingdom",
];

/// Entries of the JHU tables that are not countries
pub const DEFAULT_EXCLUDED: [&str; 4] = [
    "West Bank and Gaza",
    "Diamond Princess",
    "Kosovo",
    "MS Zaandam",
];

/// Default trailing window in days
pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Default freshness window in hours (0.1 days)
pub const DEFAULT_STALE_HOURS: f64 = 2.4;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// Trailing window must cover at least one day
    #[error("Invalid window: {0}. Must be at least 1 day")]
    InvalidWindow(usize),

    /// Freshness window must be a finite, non-negative number of hours
    #[error("Invalid stale hours: {0}. Must be zero or positive")]
    InvalidStaleHours(f64),

    /// Country list ended up empty
    #[error("No countries selected. Repeat --country per name, e.g. --country Chile --country Spain")]
    NoCountries,
}

/// covidplot - Chart recent vs. cumulative COVID-19 cases per million people
#[derive(Parser, Debug)]
#[command(name = "covidplot")]
#[command(about = "Compare recent and cumulative COVID-19 cases per million people")]
#[command(version)]
pub struct Cli {
    /// Directory for downloaded CSV files (defaults to the user cache directory)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Population table with `Country,Population` columns
    #[arg(long, value_name = "FILE", default_value = DEFAULT_POPULATION_PATH)]
    pub population: PathBuf,

    /// Length of the trailing window in days
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_WINDOW_DAYS)]
    pub window: usize,

    /// Hours after which downloaded data is fetched again
    #[arg(long, value_name = "HOURS", default_value_t = DEFAULT_STALE_HOURS)]
    pub stale_hours: f64,

    /// Country to chart, repeat for more (replaces the default list)
    ///
    /// Names are matched exactly and may contain commas.
    ///
    /// Examples:
    ///   covidplot --country Chile --country Peru
    ///   covidplot --country "Korea, South" --country "United Kingdom"
    #[arg(long = "country", value_name = "NAME", action = ArgAction::Append)]
    pub countries: Option<Vec<String>>,

    /// Table entry to drop before analysis, repeat for more
    ///
    /// Pass `--exclude ""` to drop nothing.
    #[arg(long, value_name = "NAME", action = ArgAction::Append)]
    pub exclude: Option<Vec<String>>,

    /// Print the latest values instead of opening the chart viewer
    #[arg(long)]
    pub summary: bool,
}

/// Configuration derived from CLI arguments for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Data directory override
    pub data_dir: Option<PathBuf>,
    /// Path of the population table
    pub population_path: PathBuf,
    /// Freshness window for downloads
    pub stale_after: Duration,
    /// Analysis parameters
    pub analysis: AnalysisOptions,
    /// Whether to print a summary instead of starting the UI
    pub summary: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            population_path: PathBuf::from(DEFAULT_POPULATION_PATH),
            stale_after: hours_to_duration(DEFAULT_STALE_HOURS),
            analysis: AnalysisOptions {
                window_days: DEFAULT_WINDOW_DAYS,
                excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
                countries: DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect(),
            },
            summary: false,
        }
    }
}

/// Trims repeated name arguments and skips empty ones
///
/// Names are never split, so JHU entries like "Korea, South" survive intact.
pub fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

impl PipelineConfig {
    /// Creates a PipelineConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` with defaults filled in
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.window == 0 {
            return Err(CliError::InvalidWindow(cli.window));
        }
        if !cli.stale_hours.is_finite() || cli.stale_hours < 0.0 {
            return Err(CliError::InvalidStaleHours(cli.stale_hours));
        }

        let defaults = Self::default();

        let countries = match &cli.countries {
            Some(names) => clean_names(names),
            None => defaults.analysis.countries,
        };
        if countries.is_empty() {
            return Err(CliError::NoCountries);
        }

        let excluded = match &cli.exclude {
            Some(names) => clean_names(names),
            None => defaults.analysis.excluded,
        };

        Ok(PipelineConfig {
            data_dir: cli.data_dir.clone(),
            population_path: cli.population.clone(),
            stale_after: hours_to_duration(cli.stale_hours),
            analysis: AnalysisOptions {
                window_days: cli.window,
                excluded,
                countries,
            },
            summary: cli.summary,
        })
    }
}
