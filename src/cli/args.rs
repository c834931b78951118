//! Command-line argument definitions for the SIGACT processor
//!
//! Defines the CLI surface with the clap derive API and maps flags onto
//! the library's run configuration.

use crate::config::{ColumnConfig, PreprocessConfig, SigactConfig, SolarConfig};
use crate::constants::{
    APP_DIR_NAME, DEFAULT_CHART_FILE, DEFAULT_DATETIME_COLUMN, DEFAULT_DATETIME_FORMAT,
    DEFAULT_EPHEMERIS_END, DEFAULT_EPHEMERIS_START, DEFAULT_GRID_COLUMN, DEFAULT_OUTPUT_FILE,
    DEFAULT_PARTITIONS, DEFAULT_UTC_OFFSET_HOURS, DEFAULT_WORKERS, EPHEMERIS_FILE_NAME,
};
use crate::error::{Result, SigactError};
use crate::models::Strategy;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the SIGACT daylight processor
///
/// Attaches geographic coordinates and sunrise/sunset/daylight flags to
/// significant-activity incident records, comparing a partitioned parallel
/// pass against a sequential one.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sigact-processor",
    version,
    about = "Enrich incident records with coordinates and daylight flags",
    long_about = "Resolves MGRS grid references to latitude/longitude, computes local sunrise \
                  and sunset for each incident's day and flags whether the incident happened in \
                  daylight. Benchmarks a partitioned parallel pass against a sequential pass \
                  and charts the comparison."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Enrich an incident table and benchmark the execution strategies
    Run(RunArgs),
    /// Generate the solar ephemeris table used for daylight computation
    Ephemeris(EphemerisArgs),
}

/// Which strategies a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    /// Parallel then sequential, with a comparison chart
    Both,
    /// Partitioned worker pool only
    Parallel,
    /// Single-threaded only
    Sequential,
}

impl StrategyChoice {
    /// The single strategy to run, or `None` for a benchmark of both
    pub fn single(self) -> Option<Strategy> {
        match self {
            StrategyChoice::Both => None,
            StrategyChoice::Parallel => Some(Strategy::Parallel),
            StrategyChoice::Sequential => Some(Strategy::Sequential),
        }
    }
}

/// Arguments for the run command
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Input CSV file with incident records
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Output CSV file for the enriched records
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT_FILE
    )]
    pub output_path: PathBuf,

    /// Solar ephemeris table
    ///
    /// Defaults to the file written by the `ephemeris` command in the user
    /// data directory.
    #[arg(short = 'e', long = "ephemeris", value_name = "PATH")]
    pub ephemeris_path: Option<PathBuf>,

    /// SVG file for the parallel/sequential comparison chart
    #[arg(long = "chart", value_name = "PATH", default_value = DEFAULT_CHART_FILE)]
    pub chart_path: PathBuf,

    /// Strategies to execute
    #[arg(long = "strategy", value_enum, default_value = "both")]
    pub strategy: StrategyChoice,

    /// Size of the parallel worker pool
    #[arg(short = 'w', long = "workers", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Number of partitions for the parallel strategy
    #[arg(short = 'p', long = "partitions", default_value_t = DEFAULT_PARTITIONS)]
    pub partitions: usize,

    /// Fixed local offset from UTC in hours
    #[arg(long = "utc-offset", default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_hyphen_values = true)]
    pub utc_offset_hours: i32,

    /// Grid reference column
    #[arg(long = "grid-column", default_value = DEFAULT_GRID_COLUMN)]
    pub grid_column: String,

    /// Timestamp column
    #[arg(long = "datetime-column", default_value = DEFAULT_DATETIME_COLUMN)]
    pub datetime_column: String,

    /// chrono format of the timestamp column
    #[arg(long = "datetime-format", default_value = DEFAULT_DATETIME_FORMAT)]
    pub datetime_format: String,

    /// Skip category/unit filtering and text normalisation
    #[arg(long = "no-prepare")]
    pub no_prepare: bool,

    /// Hide progress bars
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl RunArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.quiet, self.verbose)
    }

    /// Progress bars are shown unless quiet or explicitly disabled
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Resolve the ephemeris path, falling back to the user data directory
    pub fn get_ephemeris_path(&self) -> Result<PathBuf> {
        match &self.ephemeris_path {
            Some(path) => Ok(path.clone()),
            None => default_ephemeris_path(),
        }
    }

    /// Build the run configuration from the flags
    pub fn to_config(&self) -> SigactConfig {
        let mut config = SigactConfig::default()
            .with_workers(self.workers)
            .with_partitions(self.partitions)
            .with_columns(ColumnConfig {
                grid_reference: self.grid_column.clone(),
                datetime: self.datetime_column.clone(),
                datetime_format: self.datetime_format.clone(),
            })
            .with_solar(SolarConfig {
                utc_offset_hours: self.utc_offset_hours,
                ..SolarConfig::default()
            });
        if self.no_prepare {
            config.preprocess = PreprocessConfig::disabled();
        }
        if !self.show_progress() {
            config = config.without_progress();
        }
        config
    }
}

/// Arguments for the ephemeris command
#[derive(Debug, Clone, Parser)]
pub struct EphemerisArgs {
    /// Output CSV file (defaults to the user data directory)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// First UTC day of the table
    #[arg(long = "start", default_value = DEFAULT_EPHEMERIS_START)]
    pub start: NaiveDate,

    /// Last UTC day of the table
    #[arg(long = "end", default_value = DEFAULT_EPHEMERIS_END)]
    pub end: NaiveDate,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl EphemerisArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.quiet, self.verbose)
    }

    pub fn get_output_path(&self) -> Result<PathBuf> {
        match &self.output_path {
            Some(path) => Ok(path.clone()),
            None => default_ephemeris_path(),
        }
    }
}

impl Commands {
    pub fn get_log_level(&self) -> &'static str {
        match self {
            Commands::Run(args) => args.get_log_level(),
            Commands::Ephemeris(args) => args.get_log_level(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        match self {
            Commands::Run(args) => args.quiet,
            Commands::Ephemeris(args) => args.quiet,
        }
    }
}

fn log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Ephemeris location under the platform's user data directory
pub fn default_ephemeris_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        SigactError::configuration("could not determine user data directory; pass --ephemeris")
    })?;
    Ok(data_dir.join(APP_DIR_NAME).join(EPHEMERIS_FILE_NAME))
}
