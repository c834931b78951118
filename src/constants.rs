//! Application constants for the incident enrichment benchmark
//!
//! Default values, column names and the fixed astronomical and geodetic
//! parameters used throughout the processor.

// =============================================================================
// Dataset Columns and Formats
// =============================================================================

/// Column holding the MGRS grid reference in the source dataset
pub const DEFAULT_GRID_COLUMN: &str = "MGRS";

/// Column holding the civil timestamp in the source dataset
pub const DEFAULT_DATETIME_COLUMN: &str = "Datetime";

/// Timestamp format of the source dataset
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fallback format accepted when the primary format does not match
pub const FALLBACK_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used for sunrise/sunset output columns
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output columns appended to every enriched row
pub mod output_columns {
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "lon";
    pub const SUNRISE: &str = "Sunrise";
    pub const SUNSET: &str = "Sunset";
    pub const DAYLIGHT: &str = "Daylight";
}

/// Categorical columns touched by dataset preparation
pub mod categorical_columns {
    pub const CATEGORY: &str = "Category";
    pub const UNIT_TYPE: &str = "Type_of_unit";
    pub const TYPE: &str = "Type";
    pub const AFFILIATION: &str = "Affiliation";

    /// Columns whose values are capitalised during preparation
    pub const CAPITALISED: &[&str] = &[TYPE, CATEGORY, AFFILIATION];
}

/// Incident categories kept by default (regular expression)
pub const DEFAULT_CATEGORY_PATTERN: &str = "Indirect Fire|IED Explosion|Safire";

/// Unit types kept by default (regular expression)
pub const DEFAULT_UNIT_PATTERN: &str = "CF|Coalition|Coalition Forces|ISF";

/// Unit type normalisation applied during preparation
pub const UNIT_TYPE_ALIASES: &[(&str, &str)] = &[
    ("CF", "Coalition Forces"),
    ("Coalition", "Coalition Forces"),
    ("ISF", "Iraqi Security Forces"),
];

// =============================================================================
// Execution Defaults
// =============================================================================

/// Number of partitions the parallel strategy splits the dataset into
pub const DEFAULT_PARTITIONS: usize = 500;

/// Size of the parallel worker pool
pub const DEFAULT_WORKERS: usize = 6;

/// Grace period granted to the worker pool on shutdown (seconds)
pub const POOL_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Default output file for enriched records
pub const DEFAULT_OUTPUT_FILE: &str = "incidents_daylight.csv";

/// Default file for the persisted benchmark chart
pub const DEFAULT_CHART_FILE: &str = "parallel_sequential_comparison.svg";

// =============================================================================
// Astronomical Parameters
// =============================================================================

/// Fixed local offset from UTC (Iraq, no daylight saving)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

/// Solar centre altitude at apparent sunrise/sunset: refraction plus semi-diameter
pub const SUNRISE_SUNSET_ALTITUDE_DEG: f64 = -0.8333;

/// Coarse sampling step of the horizon-crossing search
pub const DEFAULT_SEARCH_STEP_MINUTES: u32 = 5;

/// Length of the UTC search window starting at 00:00 of the record's date
pub const SEARCH_WINDOW_HOURS: i64 = 23;

/// Bisection iterations refining each crossing (5 min / 2^20 is well under a millisecond)
pub const CROSSING_REFINEMENT_STEPS: u32 = 20;

/// Julian date of the J2000.0 epoch
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;

/// Julian date of the Unix epoch
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;

/// Days per Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Default span of a generated ephemeris table
pub const DEFAULT_EPHEMERIS_START: &str = "1990-01-01";
pub const DEFAULT_EPHEMERIS_END: &str = "2030-12-31";

/// Default ephemeris file name inside the application data directory
pub const EPHEMERIS_FILE_NAME: &str = "solar_ephemeris.csv";

/// Application directory name used under the user data directory
pub const APP_DIR_NAME: &str = "sigact-processor";

/// Ephemeris table columns
pub mod ephemeris_columns {
    pub const DATE: &str = "date";
    pub const RIGHT_ASCENSION: &str = "right_ascension";
    pub const DECLINATION: &str = "declination";
}

// =============================================================================
// Geodesy (WGS84 / UTM)
// =============================================================================

/// WGS84 semi-major axis (metres)
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// UTM central meridian scale factor
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting (metres)
pub const UTM_FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing applied in the southern hemisphere (metres)
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Tolerance around a latitude band when validating a decoded position (degrees)
pub const BAND_LATITUDE_TOLERANCE_DEG: f64 = 0.5;

// =============================================================================
// Benchmark Chart
// =============================================================================

pub mod chart {
    pub const WIDTH: u32 = 800;
    pub const HEIGHT: u32 = 500;

    /// Headroom added above the slower bar (seconds)
    pub const Y_AXIS_HEADROOM_SECS: f64 = 50.0;

    pub const PARALLEL_LABEL: &str = "Parallel";
    pub const SEQUENTIAL_LABEL: &str = "Sequential";
    pub const PARALLEL_COLOUR: &str = "blue";
    pub const SEQUENTIAL_COLOUR: &str = "orange";

    /// Width of each bar relative to its slot
    pub const BAR_WIDTH_FRACTION: f64 = 0.5;

    /// Width of the terminal rendering in characters
    pub const TERMINAL_BAR_WIDTH: usize = 50;
}
