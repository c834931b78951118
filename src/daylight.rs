//! Sunrise, sunset and daylight classification.
//!
//! For a record's civil date the classifier scans the UTC window
//! `[00:00, 23:00]` of that date for discrete horizon crossings of the
//! solar centre, refines each crossing by bisection, shifts the events to
//! the fixed local offset and compares times of day.
//!
//! A day is only classified when the window holds exactly one rise
//! followed by one set and both shifted events fall on the record's civil
//! date; anything else (polar day or night, longitudes whose events straddle
//! the window, gaps in the ephemeris) yields [`SolarOutcome::Unknown`].

use crate::config::SolarConfig;
use crate::constants::{CROSSING_REFINEMENT_STEPS, SEARCH_WINDOW_HOURS};
use crate::ephemeris::{SolarEphemeris, greenwich_mean_sidereal_deg, julian_date};
use crate::models::{Coordinates, SolarDay, SolarOutcome};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use tracing::trace;

/// Direction of a horizon crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Rise,
    Set,
}

/// A discrete rise or set event, in UTC rounded to the second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonEvent {
    pub at: NaiveDateTime,
    pub crossing: Crossing,
}

/// Computes solar days against a shared, immutable ephemeris
#[derive(Debug, Clone)]
pub struct DaylightClassifier {
    ephemeris: Arc<SolarEphemeris>,
    solar: SolarConfig,
}

impl DaylightClassifier {
    pub fn new(ephemeris: Arc<SolarEphemeris>, solar: SolarConfig) -> Self {
        Self { ephemeris, solar }
    }

    pub fn ephemeris(&self) -> &SolarEphemeris {
        &self.ephemeris
    }

    /// Solar centre altitude in degrees at a UTC instant
    pub fn altitude(&self, location: Coordinates, instant: NaiveDateTime) -> Option<f64> {
        let position = self.ephemeris.sun_position(instant)?;
        let sidereal = greenwich_mean_sidereal_deg(julian_date(instant));
        let hour_angle = (sidereal + location.longitude - position.right_ascension).to_radians();

        let latitude = location.latitude.to_radians();
        let declination = position.declination.to_radians();
        let sin_altitude = latitude.sin() * declination.sin()
            + latitude.cos() * declination.cos() * hour_angle.cos();
        Some(sin_altitude.clamp(-1.0, 1.0).asin().to_degrees())
    }

    /// All horizon crossings in the UTC search window of `date`.
    ///
    /// Returns `None` when the ephemeris cannot serve part of the window.
    pub fn horizon_events(&self, location: Coordinates, date: NaiveDate) -> Option<Vec<HorizonEvent>> {
        let window_start = date.and_time(NaiveTime::MIN);
        let window_secs = (SEARCH_WINDOW_HOURS * 3600) as f64;
        let step_secs = f64::from(self.solar.search_step_minutes) * 60.0;
        let horizon = self.solar.horizon_altitude_deg;
        if step_secs <= 0.0 {
            trace!("Horizon search step is zero; no events computed");
            return None;
        }

        let is_up = |offset_secs: f64| -> Option<bool> {
            let instant = window_start + Duration::microseconds((offset_secs * 1e6).round() as i64);
            self.altitude(location, instant).map(|alt| alt > horizon)
        };

        let mut events = Vec::new();
        let mut previous_offset = 0.0;
        let mut previous_up = is_up(previous_offset)?;

        while previous_offset < window_secs {
            let offset = (previous_offset + step_secs).min(window_secs);
            let up = is_up(offset)?;

            if up != previous_up {
                let (mut low, mut high) = (previous_offset, offset);
                for _ in 0..CROSSING_REFINEMENT_STEPS {
                    let mid = (low + high) / 2.0;
                    if is_up(mid)? == previous_up {
                        low = mid;
                    } else {
                        high = mid;
                    }
                }
                let crossing_secs = ((low + high) / 2.0).round() as i64;
                events.push(HorizonEvent {
                    at: window_start + Duration::seconds(crossing_secs),
                    crossing: if up { Crossing::Rise } else { Crossing::Set },
                });
            }

            previous_offset = offset;
            previous_up = up;
        }

        Some(events)
    }

    /// Local sunrise and sunset of `date`, if the day has exactly one of each in order
    pub fn sunrise_sunset(
        &self,
        location: Coordinates,
        date: NaiveDate,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if !location.is_valid() {
            trace!("Invalid location {:?}", location);
            return None;
        }

        let events = self.horizon_events(location, date)?;
        let (rise, set) = match events.as_slice() {
            [rise, set] if rise.crossing == Crossing::Rise && set.crossing == Crossing::Set => {
                (rise.at, set.at)
            }
            other => {
                trace!(
                    "No single rise/set pair at {:?} on {}: {} events",
                    location,
                    date,
                    other.len()
                );
                return None;
            }
        };

        let offset = self.solar.utc_offset();
        let sunrise = rise + offset;
        let sunset = set + offset;
        if sunrise.date() != date || sunset.date() != date {
            trace!(
                "Local events {} / {} leave civil date {}",
                sunrise, sunset, date
            );
            return None;
        }
        Some((sunrise, sunset))
    }

    /// Classify a local civil timestamp at a location
    pub fn classify(&self, location: Coordinates, local: NaiveDateTime) -> SolarOutcome {
        match self.sunrise_sunset(location, local.date()) {
            Some((sunrise, sunset)) => SolarOutcome::Known(SolarDay {
                sunrise,
                sunset,
                daylight: SolarDay::classify_time(sunrise, sunset, local.time()),
            }),
            None => SolarOutcome::Unknown,
        }
    }
}
