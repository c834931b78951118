//! Configuration management and validation.
//!
//! Provides the run configuration for dataset columns, preparation
//! filters, solar computation parameters and the parallel execution
//! layout, plus detection of the host's processing capabilities.

use crate::constants::{
    DEFAULT_CATEGORY_PATTERN, DEFAULT_DATETIME_COLUMN, DEFAULT_DATETIME_FORMAT,
    DEFAULT_GRID_COLUMN, DEFAULT_PARTITIONS, DEFAULT_SEARCH_STEP_MINUTES, DEFAULT_UNIT_PATTERN,
    DEFAULT_UTC_OFFSET_HOURS, DEFAULT_WORKERS, SUNRISE_SUNSET_ALTITUDE_DEG,
};
use crate::error::{Result, SigactError};
use chrono::{Duration, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Source column layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column with the MGRS grid reference
    pub grid_reference: String,

    /// Column with the civil timestamp
    pub datetime: String,

    /// chrono format of the timestamp column
    pub datetime_format: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            grid_reference: DEFAULT_GRID_COLUMN.to_string(),
            datetime: DEFAULT_DATETIME_COLUMN.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

/// Dataset preparation applied before enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Apply filtering and normalisation at all
    pub enabled: bool,

    /// Categories to keep (regular expression, substring match)
    pub category_pattern: String,

    /// Unit types to keep (regular expression, substring match)
    pub unit_pattern: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            category_pattern: DEFAULT_CATEGORY_PATTERN.to_string(),
            unit_pattern: DEFAULT_UNIT_PATTERN.to_string(),
        }
    }
}

impl PreprocessConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Compile both filters
    pub fn compile(&self) -> Result<(Regex, Regex)> {
        let category = Regex::new(&self.category_pattern).map_err(|e| {
            SigactError::configuration(format!(
                "invalid category pattern '{}': {}",
                self.category_pattern, e
            ))
        })?;
        let unit = Regex::new(&self.unit_pattern).map_err(|e| {
            SigactError::configuration(format!(
                "invalid unit pattern '{}': {}",
                self.unit_pattern, e
            ))
        })?;
        Ok((category, unit))
    }
}

/// Parameters of the sunrise/sunset computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Fixed local offset from UTC applied to all timestamps
    pub utc_offset_hours: i32,

    /// Solar centre altitude defining rise and set (degrees)
    pub horizon_altitude_deg: f64,

    /// Coarse sampling step of the crossing search (minutes)
    pub search_step_minutes: u32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            horizon_altitude_deg: SUNRISE_SUNSET_ALTITUDE_DEG,
            search_step_minutes: DEFAULT_SEARCH_STEP_MINUTES,
        }
    }
}

impl SolarConfig {
    pub fn utc_offset(&self) -> Duration {
        Duration::hours(i64::from(self.utc_offset_hours))
    }

    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
    }
}

/// Global configuration for an enrichment run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigactConfig {
    /// Size of the parallel worker pool
    pub workers: usize,

    /// Number of partitions for the parallel strategy
    pub partitions: usize,

    /// Show progress bars during both passes
    pub show_progress: bool,

    /// Source column layout
    pub columns: ColumnConfig,

    /// Dataset preparation
    pub preprocess: PreprocessConfig,

    /// Solar computation
    pub solar: SolarConfig,
}

impl Default for SigactConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            partitions: DEFAULT_PARTITIONS,
            show_progress: true,
            columns: ColumnConfig::default(),
            preprocess: PreprocessConfig::default(),
            solar: SolarConfig::default(),
        }
    }
}

impl SigactConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Create configuration with custom partition count
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set the fixed local offset in hours
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.solar.utc_offset_hours = hours;
        self
    }

    /// Disable progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Disable dataset preparation
    pub fn without_preprocessing(mut self) -> Self {
        self.preprocess.enabled = false;
        self
    }

    /// Configure the source column layout
    pub fn with_columns(mut self, columns: ColumnConfig) -> Self {
        self.columns = columns;
        self
    }

    /// Configure the solar computation
    pub fn with_solar(mut self, solar: SolarConfig) -> Self {
        self.solar = solar;
        self
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SigactError::configuration("workers must be at least 1"));
        }
        if self.partitions == 0 {
            return Err(SigactError::configuration("partitions must be at least 1"));
        }
        if self.solar.fixed_offset().is_none() || !(-12..=14).contains(&self.solar.utc_offset_hours)
        {
            return Err(SigactError::configuration(format!(
                "UTC offset {}h is out of range (-12..=14)",
                self.solar.utc_offset_hours
            )));
        }
        if !(1..=60).contains(&self.solar.search_step_minutes) {
            return Err(SigactError::configuration(format!(
                "search step {} min is out of range (1..=60)",
                self.solar.search_step_minutes
            )));
        }
        if !self.solar.horizon_altitude_deg.is_finite()
            || self.solar.horizon_altitude_deg.abs() > 18.0
        {
            return Err(SigactError::configuration(format!(
                "horizon altitude {}° is out of range",
                self.solar.horizon_altitude_deg
            )));
        }
        if self.preprocess.enabled {
            self.preprocess.compile()?;
        }

        let cpu_cores = num_cpus::get();
        if self.workers > cpu_cores {
            warn!(
                "{} workers requested but only {} logical cores available",
                self.workers, cpu_cores
            );
        }
        debug!(
            "Configuration valid: {} workers, {} partitions, UTC{:+}",
            self.workers, self.partitions, self.solar.utc_offset_hours
        );
        Ok(())
    }
}

/// System profiling information for reporting
#[derive(Debug, Clone)]
pub struct SystemProfile {
    /// Number of logical CPU cores available
    pub cpu_cores: usize,
    /// Number of physical cores
    pub physical_cores: usize,
    /// CPU model name, when the platform reports one
    pub cpu_brand: Option<String>,
}

impl SystemProfile {
    /// Auto-detect system capabilities
    pub fn detect() -> Self {
        use sysinfo::System;

        let cpu_cores = num_cpus::get();
        let physical_cores = num_cpus::get_physical();

        let mut system = System::new();
        system.refresh_cpu_all();
        let cpu_brand = system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());

        Self {
            cpu_cores,
            physical_cores,
            cpu_brand,
        }
    }
}
