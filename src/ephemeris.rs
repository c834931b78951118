//! Solar ephemeris table.
//!
//! The ephemeris is an external, read-only data file holding the Sun's
//! apparent right ascension and declination at 00:00 UTC for a run of
//! consecutive days. It is loaded once per run and shared immutably by
//! every worker; positions between tabulated days are interpolated.
//!
//! Tables are produced by [`SolarEphemeris::generate`] from the
//! low-precision solar theory (about 0.01 degree), which is far below the
//! one-minute precision expected of sunrise and sunset times.

use crate::constants::{
    DAYS_PER_JULIAN_CENTURY, J2000_JULIAN_DATE, UNIX_EPOCH_JULIAN_DATE, ephemeris_columns,
};
use crate::dataset::{read_text_frame, string_column, write_frame};
use crate::error::{Result, SigactError};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Apparent equatorial position of the Sun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialPosition {
    /// Right ascension in degrees, 0..360
    pub right_ascension: f64,
    /// Declination in degrees
    pub declination: f64,
}

/// Daily solar positions over a contiguous date range
#[derive(Debug, Clone, PartialEq)]
pub struct SolarEphemeris {
    start: NaiveDate,
    right_ascension: Vec<f64>,
    declination: Vec<f64>,
}

impl SolarEphemeris {
    /// Build a table from daily positions starting at `start`
    pub fn from_positions(start: NaiveDate, positions: &[EquatorialPosition]) -> Result<Self> {
        if positions.len() < 2 {
            return Err(SigactError::corrupt_ephemeris(
                positions.len(),
                "at least two consecutive days are required",
            ));
        }
        for (row, position) in positions.iter().enumerate() {
            validate_position(row, position)?;
        }

        Ok(Self {
            start,
            right_ascension: positions.iter().map(|p| p.right_ascension).collect(),
            declination: positions.iter().map(|p| p.declination).collect(),
        })
    }

    /// Compute a table covering `start..=end` from the analytic solar theory
    pub fn generate(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(SigactError::configuration(format!(
                "ephemeris range {} .. {} is empty",
                start, end
            )));
        }

        let positions: Vec<EquatorialPosition> = start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| apparent_sun(julian_date(day.and_time(chrono::NaiveTime::MIN))))
            .collect();

        debug!(
            "Generated {} daily solar positions from {} to {}",
            positions.len(),
            start,
            end
        );
        Self::from_positions(start, &positions)
    }

    /// Load a table written by [`SolarEphemeris::write_csv`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SigactError::EphemerisUnavailable {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let frame = read_text_frame(path).map_err(|e| SigactError::EphemerisUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let source = path.display().to_string();
        let dates = string_column(&frame, ephemeris_columns::DATE, &source)?;
        let ras = string_column(&frame, ephemeris_columns::RIGHT_ASCENSION, &source)?;
        let decs = string_column(&frame, ephemeris_columns::DECLINATION, &source)?;

        let start = dates
            .first()
            .and_then(|d| d.as_deref())
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .ok_or_else(|| SigactError::corrupt_ephemeris(0, "missing or invalid start date"))?;

        let mut positions = Vec::with_capacity(dates.len());
        for (row, ((date, ra), dec)) in dates.iter().zip(&ras).zip(&decs).enumerate() {
            let expected = start + chrono::Duration::days(row as i64);
            let date = date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
                .ok_or_else(|| SigactError::corrupt_ephemeris(row, "invalid date"))?;
            if date != expected {
                return Err(SigactError::corrupt_ephemeris(
                    row,
                    format!("expected {} but found {}", expected, date),
                ));
            }
            positions.push(EquatorialPosition {
                right_ascension: parse_degrees(row, ra.as_deref())?,
                declination: parse_degrees(row, dec.as_deref())?,
            });
        }

        let ephemeris = Self::from_positions(start, &positions)?;
        info!(
            "Loaded solar ephemeris {} .. {} ({} days) from {}",
            ephemeris.first_date(),
            ephemeris.last_date(),
            ephemeris.len(),
            path.display()
        );
        Ok(ephemeris)
    }

    /// Persist the table as CSV
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let dates: Vec<String> = (0..self.len())
            .map(|i| (self.start + chrono::Duration::days(i as i64)).to_string())
            .collect();
        let ras: Vec<String> = self
            .right_ascension
            .iter()
            .map(|v| format!("{:.8}", v))
            .collect();
        let decs: Vec<String> = self.declination.iter().map(|v| format!("{:.8}", v)).collect();

        let mut frame = DataFrame::new(vec![
            Column::new(ephemeris_columns::DATE.into(), dates),
            Column::new(ephemeris_columns::RIGHT_ASCENSION.into(), ras),
            Column::new(ephemeris_columns::DECLINATION.into(), decs),
        ])?;
        write_frame(&mut frame, path)?;

        info!(
            "Wrote solar ephemeris ({} days) to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.declination.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declination.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.start
    }

    pub fn last_date(&self) -> NaiveDate {
        self.start + chrono::Duration::days(self.len() as i64 - 1)
    }

    /// Whether positions can be interpolated at `instant` (UTC)
    pub fn covers(&self, instant: NaiveDateTime) -> bool {
        self.bracket(instant).is_some()
    }

    /// Interpolated apparent position at `instant` (UTC), if the table covers it
    pub fn sun_position(&self, instant: NaiveDateTime) -> Option<EquatorialPosition> {
        let (index, fraction) = self.bracket(instant)?;

        let ra0 = self.right_ascension[index];
        let mut delta_ra = self.right_ascension[index + 1] - ra0;
        if delta_ra > 180.0 {
            delta_ra -= 360.0;
        } else if delta_ra < -180.0 {
            delta_ra += 360.0;
        }

        let dec0 = self.declination[index];
        let dec1 = self.declination[index + 1];

        Some(EquatorialPosition {
            right_ascension: (ra0 + fraction * delta_ra).rem_euclid(360.0),
            declination: dec0 + fraction * (dec1 - dec0),
        })
    }

    /// Row index and day fraction of `instant`, requiring the following row to exist
    fn bracket(&self, instant: NaiveDateTime) -> Option<(usize, f64)> {
        let day = (instant.date() - self.start).num_days();
        if day < 0 {
            return None;
        }
        let index = usize::try_from(day).ok()?;
        if index + 1 >= self.len() {
            return None;
        }
        let time = instant.time();
        let seconds = f64::from(time.num_seconds_from_midnight())
            + f64::from(time.nanosecond()) / 1_000_000_000.0;
        Some((index, seconds / 86_400.0))
    }
}

fn parse_degrees(row: usize, value: Option<&str>) -> Result<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .ok_or_else(|| SigactError::corrupt_ephemeris(row, "missing or non-numeric angle"))
}

fn validate_position(row: usize, position: &EquatorialPosition) -> Result<()> {
    if !position.right_ascension.is_finite() || !(0.0..360.0).contains(&position.right_ascension)
    {
        return Err(SigactError::corrupt_ephemeris(
            row,
            format!("right ascension {} outside 0..360", position.right_ascension),
        ));
    }
    // The solar declination never exceeds the obliquity of the ecliptic
    if !position.declination.is_finite() || position.declination.abs() > 24.0 {
        return Err(SigactError::corrupt_ephemeris(
            row,
            format!("declination {} outside ±24", position.declination),
        ));
    }
    Ok(())
}

/// Julian date of a UTC timestamp
pub fn julian_date(instant: NaiveDateTime) -> f64 {
    let utc = instant.and_utc();
    let seconds = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9;
    seconds / 86_400.0 + UNIX_EPOCH_JULIAN_DATE
}

/// Julian centuries since J2000.0
pub fn julian_centuries(julian_date: f64) -> f64 {
    (julian_date - J2000_JULIAN_DATE) / DAYS_PER_JULIAN_CENTURY
}

/// Greenwich mean sidereal time in degrees, 0..360
pub fn greenwich_mean_sidereal_deg(julian_date: f64) -> f64 {
    let t = julian_centuries(julian_date);
    (280.460_618_37 + 360.985_647_366_29 * (julian_date - J2000_JULIAN_DATE)
        + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0)
        .rem_euclid(360.0)
}

/// Apparent solar position from the low-precision theory (geometric mean
/// longitude, equation of centre, nutation and aberration in longitude)
pub fn apparent_sun(julian_date: f64) -> EquatorialPosition {
    let t = julian_centuries(julian_date);

    let mean_longitude = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let mean_anomaly = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let centre = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * mean_anomaly.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * mean_anomaly).sin()
        + 0.000_289 * (3.0 * mean_anomaly).sin();

    let omega = (125.04 - 1_934.136 * t).to_radians();
    let apparent_longitude =
        (mean_longitude + centre - 0.005_69 - 0.004_78 * omega.sin()).to_radians();

    let mean_obliquity = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0
        - (46.815_0 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) / 3600.0;
    let obliquity = (mean_obliquity + 0.002_56 * omega.cos()).to_radians();

    let (sin_lambda, cos_lambda) = apparent_longitude.sin_cos();
    let right_ascension = (obliquity.cos() * sin_lambda)
        .atan2(cos_lambda)
        .to_degrees()
        .rem_euclid(360.0);
    let declination = (obliquity.sin() * sin_lambda).asin().to_degrees();

    EquatorialPosition {
        right_ascension,
        declination,
    }
}
