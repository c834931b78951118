//! SIGACT Processor Library
//!
//! Enriches significant-activity incident records with the geographic
//! position of their MGRS grid reference and with the local sunrise, sunset
//! and daylight flag for the moment they happened.
//!
//! This library provides tools for:
//! - Decoding MGRS grid references to WGS84 latitude/longitude
//! - Generating and interpolating a daily solar ephemeris table
//! - Finding sunrise and sunset for a location and civil day
//! - Preparing incident tables (filtering, normalisation) with Polars
//! - Running the enrichment sequentially or partitioned across a worker pool
//! - Charting the parallel versus sequential execution time

pub mod config;
pub mod constants;
pub mod daylight;
pub mod dataset;
pub mod enrichment;
pub mod ephemeris;
pub mod error;
pub mod mgrs;
pub mod models;
pub mod processor;
pub mod report;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{SigactConfig, SystemProfile};
pub use enrichment::{Enrich, RecordEnricher};
pub use ephemeris::SolarEphemeris;
pub use error::{Result, SigactError};
pub use models::{
    Coordinates, Daylight, EnrichedIncident, IncidentRecord, LocatedIncident, SolarOutcome,
    Strategy,
};
pub use processor::{BatchExecutor, BenchmarkRun};
pub use report::BenchmarkReport;
