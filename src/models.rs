//! Core data structures for incident enrichment.
//!
//! Records move through the pipeline as progressively richer values:
//! [`IncidentRecord`] (as read), [`LocatedIncident`] (grid reference
//! resolved), and [`EnrichedIncident`] (solar fields attached).

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One observed event as read from the source dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Zero-based row index in the prepared source table
    pub row: usize,
    /// Civil timestamp, interpreted at the fixed local offset
    pub datetime: NaiveDateTime,
    /// Raw MGRS grid reference
    pub grid_reference: String,
}

impl IncidentRecord {
    pub fn new(row: usize, datetime: NaiveDateTime, grid_reference: impl Into<String>) -> Self {
        Self {
            row,
            datetime,
            grid_reference: grid_reference.into(),
        }
    }
}

/// Geographic position in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A record whose grid reference resolved to a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedIncident {
    pub record: IncidentRecord,
    pub location: Coordinates,
}

/// Daylight classification of a known solar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Daylight {
    Night = 0,
    Day = 1,
}

impl Daylight {
    /// Numeric flag written to the output table
    pub fn flag(self) -> i64 {
        self as i64
    }
}

/// Sunrise and sunset on the record's civil day, with the resulting classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarDay {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
    pub daylight: Daylight,
}

impl SolarDay {
    /// Classify a local time of day against this day's sunrise and sunset.
    ///
    /// Only the time of day is compared; callers guarantee that sunrise,
    /// sunset and the classified timestamp share one civil date.
    pub fn classify_time(sunrise: NaiveDateTime, sunset: NaiveDateTime, at: NaiveTime) -> Daylight {
        if sunrise.time() < at && at < sunset.time() {
            Daylight::Day
        } else {
            Daylight::Night
        }
    }
}

/// Result of the daylight computation for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarOutcome {
    Known(SolarDay),
    /// Sentinel: sunrise, sunset and daylight could not be computed
    Unknown,
}

impl SolarOutcome {
    pub fn is_known(&self) -> bool {
        matches!(self, SolarOutcome::Known(_))
    }

    pub fn sunrise(&self) -> Option<NaiveDateTime> {
        match self {
            SolarOutcome::Known(day) => Some(day.sunrise),
            SolarOutcome::Unknown => None,
        }
    }

    pub fn sunset(&self) -> Option<NaiveDateTime> {
        match self {
            SolarOutcome::Known(day) => Some(day.sunset),
            SolarOutcome::Unknown => None,
        }
    }

    pub fn daylight(&self) -> Option<Daylight> {
        match self {
            SolarOutcome::Known(day) => Some(day.daylight),
            SolarOutcome::Unknown => None,
        }
    }
}

/// A located record with its solar fields attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedIncident {
    pub located: LocatedIncident,
    pub solar: SolarOutcome,
}

impl EnrichedIncident {
    pub fn row(&self) -> usize {
        self.located.record.row
    }
}

/// Execution strategy of a batch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Statically partitioned across a fixed worker pool
    Parallel,
    /// Row by row on the calling thread
    Sequential,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Parallel => crate::constants::chart::PARALLEL_LABEL,
            Strategy::Sequential => crate::constants::chart::SEQUENTIAL_LABEL,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one batch pass
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub strategy: Strategy,
    pub enriched: Vec<EnrichedIncident>,
    /// Wall-clock time of the enrichment pass only
    pub elapsed: Duration,
    /// Number of partitions dispatched (1 for the sequential strategy)
    pub partitions: usize,
}

impl BatchOutcome {
    pub fn unknown_count(&self) -> usize {
        self.enriched.iter().filter(|e| !e.solar.is_known()).count()
    }

    pub fn daylight_count(&self) -> usize {
        self.enriched
            .iter()
            .filter(|e| e.solar.daylight() == Some(Daylight::Day))
            .count()
    }
}

/// Row accounting for a complete run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub rows_prepared: usize,
    pub invalid_timestamps: usize,
    pub unresolved_coordinates: usize,
    pub rows_enriched: usize,
    pub unknown_daylight: usize,
    pub daylight_rows: usize,
    pub parallel_elapsed: Option<Duration>,
    pub sequential_elapsed: Option<Duration>,
}

impl ProcessingStats {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.rows_enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2007, 6, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_classify_time_is_strict() {
        let sunrise = at(4, 52);
        let sunset = at(19, 13);

        assert_eq!(
            SolarDay::classify_time(sunrise, sunset, at(13, 0).time()),
            Daylight::Day
        );
        assert_eq!(
            SolarDay::classify_time(sunrise, sunset, sunrise.time()),
            Daylight::Night
        );
        assert_eq!(
            SolarDay::classify_time(sunrise, sunset, sunset.time()),
            Daylight::Night
        );
        assert_eq!(
            SolarDay::classify_time(sunrise, sunset, at(2, 0).time()),
            Daylight::Night
        );
    }

    #[test]
    fn test_unknown_outcome_has_no_fields() {
        let outcome = SolarOutcome::Unknown;
        assert!(!outcome.is_known());
        assert_eq!(outcome.sunrise(), None);
        assert_eq!(outcome.sunset(), None);
        assert_eq!(outcome.daylight(), None);
    }

    #[test]
    fn test_daylight_flags() {
        assert_eq!(Daylight::Day.flag(), 1);
        assert_eq!(Daylight::Night.flag(), 0);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinates::new(33.3, 44.4).is_valid());
        assert!(!Coordinates::new(f64::NAN, 44.4).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
    }
}
