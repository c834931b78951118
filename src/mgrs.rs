//! MGRS grid reference resolution.
//!
//! Decodes a Military Grid Reference System string (UTM zone, latitude
//! band, 100 km square letters, easting/northing digits) into WGS84
//! latitude/longitude. Only the inverse UTM projection needed for that
//! single conversion is implemented; polar UPS references are rejected.

use crate::constants::{
    BAND_LATITUDE_TOLERANCE_DEG, UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_SCALE_FACTOR,
    WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS,
};
use crate::models::Coordinates;
use thiserror::Error;
use tracing::trace;

/// Column letters in use across the 100 km square scheme (I and O skipped)
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Row letters of the 100 km square scheme (I and O skipped)
const ROW_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUV";

/// Latitude bands C..X (I and O skipped)
const BAND_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWX";

/// Minimum northing of the 100 km squares intersecting each latitude band
const BAND_MIN_NORTHING: [f64; 20] = [
    1_100_000.0, // C
    2_000_000.0, // D
    2_800_000.0, // E
    3_700_000.0, // F
    4_600_000.0, // G
    5_500_000.0, // H
    6_400_000.0, // J
    7_300_000.0, // K
    8_200_000.0, // L
    9_100_000.0, // M
    0.0,         // N
    800_000.0,   // P
    1_700_000.0, // Q
    2_600_000.0, // R
    3_500_000.0, // S
    4_400_000.0, // T
    5_300_000.0, // U
    6_200_000.0, // V
    7_000_000.0, // W
    7_900_000.0, // X
];

/// Northing cycle of the row letters
const ROW_CYCLE_METRES: f64 = 2_000_000.0;

/// Reasons a grid reference cannot be resolved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("empty grid reference")]
    Empty,

    #[error("missing or invalid UTM zone number")]
    InvalidZone,

    #[error("zone {0} is outside 1..=60")]
    ZoneOutOfRange(u32),

    #[error("latitude band '{0}' is not a UTM band")]
    InvalidBand(char),

    #[error("100 km square '{0}' is not valid for this zone")]
    InvalidSquare(String),

    #[error("expected an even number of up to 10 digits, found '{0}'")]
    InvalidDigits(String),

    #[error("decoded latitude {latitude:.4} lies outside band '{band}'")]
    OutsideBand { band: char, latitude: f64 },
}

/// Parsed components of a grid reference
#[derive(Debug, Clone, PartialEq)]
struct GridReference {
    zone: u32,
    band: u8,
    easting: f64,
    northing: f64,
}

/// Resolve a grid reference, collapsing every failure to `None`
pub fn resolve(grid_reference: &str) -> Option<Coordinates> {
    match decode(grid_reference) {
        Ok(coordinates) => Some(coordinates),
        Err(e) => {
            trace!("Unresolved grid reference '{}': {}", grid_reference, e);
            None
        }
    }
}

/// Decode a grid reference to the south-west corner of the referenced square
pub fn decode(grid_reference: &str) -> Result<Coordinates, GridError> {
    let parsed = parse(grid_reference)?;
    let southern = parsed.band < b'N';
    let (latitude, longitude) = utm_to_geographic(
        parsed.zone,
        southern,
        parsed.easting,
        parsed.northing,
    );

    let (band_south, band_north) = band_latitude_range(parsed.band);
    if !latitude.is_finite()
        || latitude < band_south - BAND_LATITUDE_TOLERANCE_DEG
        || latitude > band_north + BAND_LATITUDE_TOLERANCE_DEG
    {
        return Err(GridError::OutsideBand {
            band: parsed.band as char,
            latitude,
        });
    }

    Ok(Coordinates::new(latitude, normalize_longitude(longitude)))
}

fn parse(grid_reference: &str) -> Result<GridReference, GridError> {
    let compact: Vec<u8> = grid_reference
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if compact.is_empty() {
        return Err(GridError::Empty);
    }

    let zone_len = compact.iter().take_while(|b| b.is_ascii_digit()).count();
    if zone_len == 0 || zone_len > 2 {
        return Err(GridError::InvalidZone);
    }
    let zone: u32 = std::str::from_utf8(&compact[..zone_len])
        .ok()
        .and_then(|z| z.parse().ok())
        .ok_or(GridError::InvalidZone)?;
    if !(1..=60).contains(&zone) {
        return Err(GridError::ZoneOutOfRange(zone));
    }

    let rest = &compact[zone_len..];
    let band = *rest.first().ok_or(GridError::InvalidBand(' '))?;
    if !BAND_LETTERS.contains(&band) {
        return Err(GridError::InvalidBand(band as char));
    }

    if rest.len() < 3 {
        return Err(GridError::InvalidSquare(
            String::from_utf8_lossy(&rest[1..]).into_owned(),
        ));
    }
    let (column, row) = (rest[1], rest[2]);
    let square = || String::from_utf8_lossy(&[column, row]).into_owned();

    let easting_100k = column_easting(zone, column).ok_or_else(|| GridError::InvalidSquare(square()))?;
    let mut northing_100k =
        row_northing(zone, row).ok_or_else(|| GridError::InvalidSquare(square()))?;

    let min_northing = BAND_MIN_NORTHING[band_index(band)];
    while northing_100k < min_northing {
        northing_100k += ROW_CYCLE_METRES;
    }

    let digits = &rest[3..];
    if digits.len() % 2 != 0 || digits.len() > 10 || !digits.iter().all(u8::is_ascii_digit) {
        return Err(GridError::InvalidDigits(
            String::from_utf8_lossy(digits).into_owned(),
        ));
    }
    let (easting_offset, northing_offset) = digit_offsets(digits);

    Ok(GridReference {
        zone,
        band,
        easting: easting_100k + easting_offset,
        northing: northing_100k + northing_offset,
    })
}

/// Zone set (1..=6) determining the lettering of 100 km squares
fn zone_set(zone: u32) -> u32 {
    match zone % 6 {
        0 => 6,
        set => set,
    }
}

/// Easting of a 100 km column letter, if the letter belongs to the zone's set
fn column_easting(zone: u32, letter: u8) -> Option<f64> {
    let origin = ((zone_set(zone) - 1) % 3) as usize * 8;
    let index = COLUMN_LETTERS.iter().position(|&l| l == letter)?;
    let offset = index.checked_sub(origin).filter(|&o| o < 8)?;
    Some((offset + 1) as f64 * 100_000.0)
}

/// Northing (modulo 2000 km) of a 100 km row letter
fn row_northing(zone: u32, letter: u8) -> Option<f64> {
    let origin = if zone_set(zone) % 2 == 0 { 5 } else { 0 };
    let index = ROW_LETTERS.iter().position(|&l| l == letter)?;
    let offset = (index + ROW_LETTERS.len() - origin) % ROW_LETTERS.len();
    Some(offset as f64 * 100_000.0)
}

fn digit_offsets(digits: &[u8]) -> (f64, f64) {
    if digits.is_empty() {
        return (0.0, 0.0);
    }
    let half = digits.len() / 2;
    let precision = 10f64.powi(5 - half as i32);
    let value = |part: &[u8]| {
        part.iter()
            .fold(0.0, |acc, d| acc * 10.0 + f64::from(d - b'0'))
    };
    (
        value(&digits[..half]) * precision,
        value(&digits[half..]) * precision,
    )
}

fn band_index(band: u8) -> usize {
    BAND_LETTERS
        .iter()
        .position(|&l| l == band)
        .unwrap_or_default()
}

/// Latitude range (south, north) of a band; X spans 12 degrees
fn band_latitude_range(band: u8) -> (f64, f64) {
    let south = -80.0 + 8.0 * band_index(band) as f64;
    let north = if band == b'X' { 84.0 } else { south + 8.0 };
    (south, north)
}

fn normalize_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Inverse transverse Mercator on the WGS84 ellipsoid (Snyder's series)
fn utm_to_geographic(zone: u32, southern: bool, easting: f64, northing: f64) -> (f64, f64) {
    let a = WGS84_SEMI_MAJOR_AXIS;
    let k0 = UTM_SCALE_FACTOR;
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
    let ep2 = e2 / (1.0 - e2);

    let x = easting - UTM_FALSE_EASTING;
    let y = if southern {
        northing - UTM_FALSE_NORTHING_SOUTH
    } else {
        northing
    };

    let m = y / k0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let n1 = a / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * k0);

    let latitude = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2) - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let longitude = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
            * d.powi(5)
            / 120.0)
        / cos_phi1;

    let central_meridian = f64::from(zone) * 6.0 - 183.0;
    (latitude.to_degrees(), central_meridian + longitude.to_degrees())
}
