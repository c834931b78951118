//! Incident dataset input, preparation and output.
//!
//! Source tables are read entirely as text so every column passes through
//! to the enriched output unchanged. Preparation reproduces the analysis
//! filters (incident category, reporting unit), whitespace trimming, unit
//! name normalisation and capitalisation of the categorical columns.

use crate::config::{ColumnConfig, PreprocessConfig};
use crate::constants::{
    FALLBACK_DATETIME_FORMAT, OUTPUT_DATETIME_FORMAT, UNIT_TYPE_ALIASES, categorical_columns,
    output_columns,
};
use crate::error::{Result, SigactError};
use crate::models::{EnrichedIncident, IncidentRecord};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read a delimited file with a header row, keeping every column as text
pub fn read_text_frame(path: &Path) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(frame)
}

/// Write a frame as CSV with a header row, creating parent directories
pub fn write_frame(frame: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)?;
    Ok(())
}

/// Extract a text column, reporting a missing column by name
pub fn string_column(
    frame: &DataFrame,
    name: &str,
    source_name: &str,
) -> Result<Vec<Option<String>>> {
    let column = frame
        .column(name)
        .map_err(|_| SigactError::missing_column(name, source_name))?;
    let values = column.as_materialized_series().str()?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Parse a civil timestamp with the configured format, falling back to seconds precision
pub fn parse_timestamp(value: &str, format: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, format)
        .or_else(|_| NaiveDateTime::parse_from_str(value, FALLBACK_DATETIME_FORMAT))
        .ok()
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn normalize_unit_type(value: &str) -> String {
    UNIT_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == value)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Records extracted from a table, with rows whose timestamp could not be parsed
#[derive(Debug, Clone, Default)]
pub struct RecordExtraction {
    pub records: Vec<IncidentRecord>,
    pub invalid_timestamps: Vec<usize>,
}

/// An incident table held as text columns
#[derive(Debug, Clone)]
pub struct IncidentTable {
    frame: DataFrame,
    source_name: String,
}

impl IncidentTable {
    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SigactError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let frame = read_text_frame(path)?;
        info!(
            "Read {} rows x {} columns from {}",
            frame.height(),
            frame.width(),
            path.display()
        );
        Ok(Self {
            frame,
            source_name: path.display().to_string(),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Drop incomplete rows, apply the category/unit filters and normalise text
    pub fn prepare(self, config: &PreprocessConfig) -> Result<Self> {
        if !config.enabled {
            debug!("Dataset preparation disabled");
            return Ok(self);
        }
        let (category_filter, unit_filter) = config.compile()?;

        let names = self.column_names();
        let mut columns = names
            .iter()
            .map(|name| string_column(&self.frame, name, &self.source_name))
            .collect::<Result<Vec<_>>>()?;

        let position = |column: &str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| SigactError::missing_column(column, self.source_name.clone()))
        };
        let category_idx = position(categorical_columns::CATEGORY)?;
        let unit_idx = position(categorical_columns::UNIT_TYPE)?;

        let height = self.frame.height();
        let keep: Vec<bool> = (0..height)
            .map(|row| {
                let complete = columns.iter().all(|column| {
                    column[row]
                        .as_deref()
                        .is_some_and(|value| !value.trim().is_empty())
                });
                complete
                    && columns[category_idx][row]
                        .as_deref()
                        .is_some_and(|v| category_filter.is_match(v))
                    && columns[unit_idx][row]
                        .as_deref()
                        .is_some_and(|v| unit_filter.is_match(v))
            })
            .collect();

        for (idx, column) in columns.iter_mut().enumerate() {
            let name = names[idx].as_str();
            let mut kept = Vec::with_capacity(height);
            for (value, _) in column.drain(..).zip(&keep).filter(|(_, keep)| **keep) {
                let trimmed = value.unwrap_or_default().trim().to_string();
                let value = if idx == unit_idx {
                    normalize_unit_type(&trimmed)
                } else if categorical_columns::CAPITALISED.contains(&name) {
                    capitalize(&trimmed)
                } else {
                    trimmed
                };
                kept.push(Some(value));
            }
            *column = kept;
        }

        let frame = DataFrame::new(
            names
                .iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name.as_str().into(), values))
                .collect(),
        )?;

        let dropped = height - frame.height();
        info!(
            "Prepared dataset: kept {} of {} rows ({} filtered out)",
            frame.height(),
            height,
            dropped
        );
        Ok(Self {
            frame,
            source_name: self.source_name,
        })
    }

    /// Extract the fields the enrichment needs, skipping unparseable timestamps
    pub fn records(&self, columns: &ColumnConfig) -> Result<RecordExtraction> {
        let grids = string_column(&self.frame, &columns.grid_reference, &self.source_name)?;
        let datetimes = string_column(&self.frame, &columns.datetime, &self.source_name)?;

        let mut extraction = RecordExtraction::default();
        for (row, (grid, datetime)) in grids.into_iter().zip(datetimes).enumerate() {
            match datetime
                .as_deref()
                .and_then(|value| parse_timestamp(value, &columns.datetime_format))
            {
                Some(datetime) => extraction.records.push(IncidentRecord::new(
                    row,
                    datetime,
                    grid.unwrap_or_default(),
                )),
                None => extraction.invalid_timestamps.push(row),
            }
        }

        if !extraction.invalid_timestamps.is_empty() {
            warn!(
                "Skipped {} rows with unparseable '{}' values",
                extraction.invalid_timestamps.len(),
                columns.datetime
            );
        }
        Ok(extraction)
    }

    /// Keep the enriched rows (in source order) and append the location and solar columns
    pub fn enriched_frame(&self, enriched: &[EnrichedIncident]) -> Result<DataFrame> {
        let height = self.frame.height();
        let mut keep = vec![false; height];
        let mut previous: Option<usize> = None;
        for incident in enriched {
            let row = incident.row();
            if row >= height || previous.is_some_and(|p| p >= row) {
                return Err(SigactError::configuration(format!(
                    "enriched row {} is out of source order or range",
                    row
                )));
            }
            keep[row] = true;
            previous = Some(row);
        }

        let mask: BooleanChunked = keep.into_iter().collect();
        let mut frame = self.frame.filter(&mask)?;

        let format = |value: Option<NaiveDateTime>| {
            value.map(|v| v.format(OUTPUT_DATETIME_FORMAT).to_string())
        };
        let latitudes: Vec<f64> = enriched
            .iter()
            .map(|e| e.located.location.latitude)
            .collect();
        let longitudes: Vec<f64> = enriched
            .iter()
            .map(|e| e.located.location.longitude)
            .collect();
        let sunrises: Vec<Option<String>> =
            enriched.iter().map(|e| format(e.solar.sunrise())).collect();
        let sunsets: Vec<Option<String>> =
            enriched.iter().map(|e| format(e.solar.sunset())).collect();
        let daylight: Vec<Option<i64>> = enriched
            .iter()
            .map(|e| e.solar.daylight().map(|d| d.flag()))
            .collect();

        frame.with_column(Column::new(output_columns::LATITUDE.into(), latitudes))?;
        frame.with_column(Column::new(output_columns::LONGITUDE.into(), longitudes))?;
        frame.with_column(Column::new(output_columns::SUNRISE.into(), sunrises))?;
        frame.with_column(Column::new(output_columns::SUNSET.into(), sunsets))?;
        frame.with_column(Column::new(output_columns::DAYLIGHT.into(), daylight))?;
        Ok(frame)
    }

    /// Write the enriched table, returning the number of rows written
    pub fn write_enriched(&self, enriched: &[EnrichedIncident], path: &Path) -> Result<usize> {
        let mut frame = self.enriched_frame(enriched)?;
        write_frame(&mut frame, path)?;
        info!("Wrote {} enriched rows to {}", frame.height(), path.display());
        Ok(frame.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Daylight, LocatedIncident, SolarDay, SolarOutcome};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Datetime,MGRS,Category,Type_of_unit,Type,Affiliation
2007-06-15 13:00,38SMB4484,Indirect Fire, CF ,ENEMY ACTION,enemy
2007-06-15 14:00,38SMB4484,Criminal Event,CF,Criminal,NEUTRAL
2007-06-15 15:00,38SMB4484,IED Explosion,ISF,Explosive hazard,ENEMY
2007-06-15 16:00,38SMB4484,Safire,Coalition,enemy action,Enemy
2007-06-15 17:00,38SMB4484,Safire,Other,enemy action,Enemy
2007-06-15 18:00,,Safire,CF,enemy action,Enemy
";

    fn write_sample(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("incidents.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn column(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
        string_column(frame, name, "test").unwrap()
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("ENEMY ACTION"), "Enemy action");
        assert_eq!(capitalize("indirect fire"), "Indirect fire");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2007, 6, 15)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(
            parse_timestamp("2007-06-15 13:00", "%Y-%m-%d %H:%M"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(" 2007-06-15 13:00:00 ", "%Y-%m-%d %H:%M"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("15/06/2007", "%Y-%m-%d %H:%M"), None);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = IncidentTable::read_csv(&temp_dir.path().join("missing.csv"));
        assert!(matches!(result, Err(SigactError::InputNotFound { .. })));
    }

    #[test]
    fn test_prepare_filters_and_normalizes() {
        let temp_dir = TempDir::new().unwrap();
        let table = IncidentTable::read_csv(&write_sample(&temp_dir, SAMPLE)).unwrap();
        assert_eq!(table.height(), 6);

        let prepared = table.prepare(&PreprocessConfig::default()).unwrap();
        assert_eq!(prepared.height(), 3);

        let frame = prepared.frame();
        assert_eq!(
            column(frame, "Datetime"),
            vec![
                Some("2007-06-15 13:00".to_string()),
                Some("2007-06-15 15:00".to_string()),
                Some("2007-06-15 16:00".to_string()),
            ]
        );
        assert_eq!(
            column(frame, "Type_of_unit"),
            vec![
                Some("Coalition Forces".to_string()),
                Some("Iraqi Security Forces".to_string()),
                Some("Coalition Forces".to_string()),
            ]
        );
        assert_eq!(
            column(frame, "Category"),
            vec![
                Some("Indirect fire".to_string()),
                Some("Ied explosion".to_string()),
                Some("Safire".to_string()),
            ]
        );
        assert_eq!(column(frame, "Affiliation")[0], Some("Enemy".to_string()));
        assert_eq!(column(frame, "Type")[0], Some("Enemy action".to_string()));
    }

    #[test]
    fn test_prepare_disabled_keeps_everything() {
        let temp_dir = TempDir::new().unwrap();
        let table = IncidentTable::read_csv(&write_sample(&temp_dir, SAMPLE)).unwrap();
        let prepared = table.prepare(&PreprocessConfig::disabled()).unwrap();
        assert_eq!(prepared.height(), 6);
    }

    #[test]
    fn test_prepare_requires_categorical_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_sample(&temp_dir, "Datetime,MGRS\n2007-06-15 13:00,38SMB4484\n");
        let table = IncidentTable::read_csv(&path).unwrap();
        assert!(matches!(
            table.prepare(&PreprocessConfig::default()),
            Err(SigactError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_records_skip_invalid_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_sample(
            &temp_dir,
            "Datetime,MGRS\n2007-06-15 13:00,38SMB4484\nyesterday,38SMB4484\n2007-06-16 09:30,INVALID123\n",
        );
        let table = IncidentTable::read_csv(&path).unwrap();
        let extraction = table.records(&ColumnConfig::default()).unwrap();

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.invalid_timestamps, vec![1]);
        assert_eq!(extraction.records[0].row, 0);
        assert_eq!(extraction.records[1].row, 2);
        assert_eq!(extraction.records[1].grid_reference, "INVALID123");
    }

    #[test]
    fn test_records_require_configured_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_sample(&temp_dir, "When,Where\n2007-06-15 13:00,38SMB4484\n");
        let table = IncidentTable::read_csv(&path).unwrap();
        assert!(matches!(
            table.records(&ColumnConfig::default()),
            Err(SigactError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_enriched_frame_appends_columns_for_kept_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_sample(
            &temp_dir,
            "Datetime,MGRS,Note\n2007-06-15 13:00,38SMB4484,a\n2007-06-15 14:00,INVALID123,b\n2007-06-15 15:00,38SMB4484,c\n",
        );
        let table = IncidentTable::read_csv(&path).unwrap();
        let records = table.records(&ColumnConfig::default()).unwrap().records;

        let day = |h| {
            NaiveDate::from_ymd_opt(2007, 6, 15)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        let located = |record: &IncidentRecord| LocatedIncident {
            record: record.clone(),
            location: Coordinates::new(33.29, 44.40),
        };
        let enriched = vec![
            EnrichedIncident {
                located: located(&records[0]),
                solar: SolarOutcome::Known(SolarDay {
                    sunrise: day(4),
                    sunset: day(19),
                    daylight: Daylight::Day,
                }),
            },
            EnrichedIncident {
                located: located(&records[2]),
                solar: SolarOutcome::Unknown,
            },
        ];

        let output = temp_dir.path().join("out").join("enriched.csv");
        let written = table.write_enriched(&enriched, &output).unwrap();
        assert_eq!(written, 2);

        let reread = IncidentTable::read_csv(&output).unwrap();
        assert_eq!(
            reread.column_names(),
            vec!["Datetime", "MGRS", "Note", "lat", "lon", "Sunrise", "Sunset", "Daylight"]
        );
        let frame = reread.frame();
        assert_eq!(
            column(frame, "Note"),
            vec![Some("a".to_string()), Some("c".to_string())]
        );
        assert_eq!(
            column(frame, "Sunrise")[0],
            Some("2007-06-15 04:00:00".to_string())
        );
        assert_eq!(column(frame, "Daylight")[0], Some("1".to_string()));
        assert_eq!(column(frame, "Daylight")[1], None);
        assert_eq!(column(frame, "Sunset")[1], None);
    }

    #[test]
    fn test_enriched_frame_rejects_out_of_order_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_sample(
            &temp_dir,
            "Datetime,MGRS\n2007-06-15 13:00,38SMB4484\n2007-06-15 14:00,38SMB4484\n",
        );
        let table = IncidentTable::read_csv(&path).unwrap();
        let records = table.records(&ColumnConfig::default()).unwrap().records;
        let enriched: Vec<EnrichedIncident> = records
            .iter()
            .rev()
            .map(|record| EnrichedIncident {
                located: LocatedIncident {
                    record: record.clone(),
                    location: Coordinates::new(33.29, 44.40),
                },
                solar: SolarOutcome::Unknown,
            })
            .collect();
        assert!(table.enriched_frame(&enriched).is_err());
    }
}
