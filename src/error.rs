//! Error handling for incident enrichment runs.
//!
//! Only run-level failures live here: unreadable input, missing columns,
//! a missing or corrupt ephemeris, pool infrastructure and partition faults.
//! Per-record failures never surface as errors; they are absorbed into
//! dropped rows or the unknown solar sentinel.

use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Required column '{column}' missing from {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Ephemeris unavailable at {path}: {reason}")]
    EphemerisUnavailable { path: PathBuf, reason: String },

    #[error("Corrupt ephemeris data at row {row}: {reason}")]
    CorruptEphemeris { row: usize, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Worker pool failed to start with {workers} workers: {reason}")]
    PoolStartup { workers: usize, reason: String },

    #[error("Partition {partition} (rows {}..{}) failed: {reason}", .rows.start, .rows.end)]
    PartitionFailed {
        partition: usize,
        rows: Range<usize>,
        reason: String,
    },

    #[error(
        "Strategy outputs diverge at record {index}: parallel and sequential enrichment disagree"
    )]
    StrategyMismatch { index: usize },

    #[error("Chart rendering failed for {path}: {reason}")]
    Report { path: PathBuf, reason: String },
}

impl SigactError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            source_name: source_name.into(),
        }
    }

    pub fn corrupt_ephemeris(row: usize, reason: impl Into<String>) -> Self {
        Self::CorruptEphemeris {
            row,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SigactError>;
