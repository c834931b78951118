//! Per-record enrichment.
//!
//! Composes grid reference resolution and daylight classification behind
//! one contract: resolution failures drop the record (once, upstream of the
//! batch), classification failures attach the unknown sentinel. Nothing
//! here returns an error.

use crate::config::SolarConfig;
use crate::daylight::DaylightClassifier;
use crate::ephemeris::SolarEphemeris;
use crate::mgrs;
use crate::models::{EnrichedIncident, IncidentRecord, LocatedIncident};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-record enrichment applied by the batch executor
pub trait Enrich: Send + Sync + 'static {
    fn enrich(&self, incident: &LocatedIncident) -> EnrichedIncident;
}

/// Resolve a record's grid reference
pub fn locate(record: IncidentRecord) -> Option<LocatedIncident> {
    let location = mgrs::resolve(&record.grid_reference)?;
    Some(LocatedIncident { record, location })
}

/// Records split by whether their grid reference resolved
#[derive(Debug, Clone, Default)]
pub struct LocateOutcome {
    pub located: Vec<LocatedIncident>,
    /// Source rows whose grid reference could not be resolved
    pub unresolved: Vec<usize>,
}

/// Resolve every record, dropping (and counting) the unresolvable ones
pub fn locate_all(records: Vec<IncidentRecord>) -> LocateOutcome {
    let mut outcome = LocateOutcome::default();
    for record in records {
        let row = record.row;
        match locate(record) {
            Some(located) => outcome.located.push(located),
            None => outcome.unresolved.push(row),
        }
    }

    if !outcome.unresolved.is_empty() {
        warn!(
            "Dropped {} records with unresolvable grid references",
            outcome.unresolved.len()
        );
    }
    debug!("Resolved {} grid references", outcome.located.len());
    outcome
}

/// Attaches sunrise, sunset and daylight to located records
#[derive(Debug, Clone)]
pub struct RecordEnricher {
    classifier: DaylightClassifier,
}

impl RecordEnricher {
    pub fn new(ephemeris: Arc<SolarEphemeris>, solar: SolarConfig) -> Self {
        Self {
            classifier: DaylightClassifier::new(ephemeris, solar),
        }
    }

    /// Full composition: resolve, then classify; `None` if the grid reference is unresolvable
    pub fn enrich_record(&self, record: IncidentRecord) -> Option<EnrichedIncident> {
        locate(record).map(|located| self.enrich(&located))
    }
}

impl Enrich for RecordEnricher {
    fn enrich(&self, incident: &LocatedIncident) -> EnrichedIncident {
        let solar = self
            .classifier
            .classify(incident.location, incident.record.datetime);
        EnrichedIncident {
            located: incident.clone(),
            solar,
        }
    }
}
