//! Tests for the batch executor
//!
//! Shared fixtures build a small located dataset over a one-year ephemeris.


use crate::config::{SigactConfig, SolarConfig};
use crate::enrichment::{RecordEnricher, locate_all};
use crate::ephemeris::SolarEphemeris;
use crate::models::{IncidentRecord, LocatedIncident};
use crate::processor::BatchExecutor;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

const GRID_REFERENCES: [&str; 4] = [
    "38SMB4484",
    "38SMB4460084800",
    "38SNB1234567890",
    "38SLC5000050000",
];

pub fn enricher() -> Arc<RecordEnricher> {
    let ephemeris = SolarEphemeris::generate(
        NaiveDate::from_ymd_opt(2007, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
    )
    .unwrap();
    Arc::new(RecordEnricher::new(
        Arc::new(ephemeris),
        SolarConfig::default(),
    ))
}

/// Records spread across the year and the clock, every seventh one past the ephemeris
pub fn located_incidents(count: usize) -> Vec<LocatedIncident> {
    let start = NaiveDate::from_ymd_opt(2007, 1, 1)
        .unwrap()
        .and_hms_opt(0, 30, 0)
        .unwrap();
    let records = (0..count)
        .map(|row| {
            let datetime = if row % 7 == 6 {
                start + Duration::days(400)
            } else {
                start + Duration::days((row * 11 % 365) as i64) + Duration::minutes((row * 97 % 1440) as i64)
            };
            IncidentRecord::new(row, datetime, GRID_REFERENCES[row % GRID_REFERENCES.len()])
        })
        .collect();

    let outcome = locate_all(records);
    assert!(outcome.unresolved.is_empty());
    outcome.located
}

pub fn executor(workers: usize, partitions: usize) -> BatchExecutor<RecordEnricher> {
    let config = SigactConfig::default()
        .with_workers(workers)
        .with_partitions(partitions)
        .without_progress();
    BatchExecutor::new(enricher(), &config)
}
