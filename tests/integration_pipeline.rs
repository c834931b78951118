//! End-to-end tests for the run and ephemeris commands
//!
//! Drives the commands through parsed CLI arguments against temporary
//! files: a one-year ephemeris and a small incident table.

use chrono::NaiveDate;
use clap::Parser;
use sigact_processor::SigactError;
use sigact_processor::cli::args::{Args, Commands, RunArgs};
use sigact_processor::cli::commands;
use sigact_processor::dataset::{read_text_frame, string_column};
use sigact_processor::ephemeris::SolarEphemeris;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INCIDENTS: &str = "\
Datetime,MGRS,Category,Type_of_unit,Type,Affiliation
2007-06-15 13:00,38SMB4484,Indirect Fire,CF,Enemy Action,ENEMY
2007-06-15 21:00,38SMB4460084800,IED Explosion,ISF,Explosive Hazard,ENEMY
2007-06-15 13:00,INVALID123,Safire,Coalition,Enemy Action,ENEMY
2007-12-21 06:30,38SMB4484,Indirect Fire,CF,Enemy Action,ENEMY
2009-03-01 12:00,38SMB4484,Indirect Fire,ISF,Enemy Action,ENEMY
not a date,38SMB4484,Indirect Fire,ISF,Enemy Action,ENEMY
";

struct Fixture {
    dir: TempDir,
    input: PathBuf,
    ephemeris: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("incidents.csv");
        std::fs::write(&input, INCIDENTS).unwrap();

        let ephemeris = dir.path().join("ephemeris.csv");
        SolarEphemeris::generate(
            NaiveDate::from_ymd_opt(2007, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
        )
        .unwrap()
        .write_csv(&ephemeris)
        .unwrap();

        Self {
            dir,
            input,
            ephemeris,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run_args(&self, extra: &[&str]) -> RunArgs {
        let output = self.path("out.csv");
        let chart = self.path("chart.svg");
        let mut argv = vec![
            "sigact-processor".to_string(),
            "run".to_string(),
            self.input.display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
            "--ephemeris".to_string(),
            self.ephemeris.display().to_string(),
            "--chart".to_string(),
            chart.display().to_string(),
            "--workers".to_string(),
            "2".to_string(),
            "--partitions".to_string(),
            "3".to_string(),
            "--quiet".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));

        match Args::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(args)) => args,
            other => panic!("Expected run command, got {:?}", other),
        }
    }
}

fn read_column(path: &Path, name: &str) -> Vec<Option<String>> {
    let frame = read_text_frame(path).unwrap();
    string_column(&frame, name, "output").unwrap()
}

#[test]
fn test_run_enriches_and_drops_unresolvable_rows() {
    let fixture = Fixture::new();
    let args = fixture.run_args(&[]);

    let stats = commands::run::execute(&args).unwrap();

    assert_eq!(stats.rows_read, 6);
    assert_eq!(stats.rows_prepared, 6);
    assert_eq!(stats.invalid_timestamps, 1);
    assert_eq!(stats.unresolved_coordinates, 1);
    assert_eq!(stats.rows_enriched, 4);
    assert_eq!(stats.unknown_daylight, 1);
    assert_eq!(stats.daylight_rows, 1);
    assert!(stats.parallel_elapsed.is_some());
    assert!(stats.sequential_elapsed.is_some());

    let output = fixture.path("out.csv");
    let frame = read_text_frame(&output).unwrap();
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    for column in ["Datetime", "MGRS", "lat", "lon", "Sunrise", "Sunset", "Daylight"] {
        assert!(names.iter().any(|n| n == column), "missing {}", column);
    }

    assert_eq!(
        read_column(&output, "MGRS"),
        vec![
            Some("38SMB4484".to_string()),
            Some("38SMB4460084800".to_string()),
            Some("38SMB4484".to_string()),
            Some("38SMB4484".to_string()),
        ]
    );
    assert_eq!(
        read_column(&output, "Daylight"),
        vec![
            Some("1".to_string()),
            Some("0".to_string()),
            Some("0".to_string()),
            None,
        ]
    );

    let sunrise = read_column(&output, "Sunrise");
    let sunset = read_column(&output, "Sunset");
    let first_sunrise = sunrise[0].as_deref().unwrap();
    let first_sunset = sunset[0].as_deref().unwrap();
    assert!(first_sunrise.starts_with("2007-06-15 04:5"));
    assert!(first_sunset.starts_with("2007-06-15 19:1"));
    assert!(first_sunrise < "2007-06-15 13:00:00" && "2007-06-15 13:00:00" < first_sunset);
    assert_eq!(sunrise[3], None);
    assert_eq!(sunset[3], None);

    let lat: f64 = read_column(&output, "lat")[0]
        .as_deref()
        .unwrap()
        .parse()
        .unwrap();
    assert!((lat - 33.2936).abs() < 1e-3);

    let chart = std::fs::read_to_string(fixture.path("chart.svg")).unwrap();
    assert!(chart.contains("Parallel") && chart.contains("Sequential"));
}

#[test]
fn test_single_strategy_skips_chart() {
    let fixture = Fixture::new();
    let args = fixture.run_args(&["--strategy", "sequential"]);

    let stats = commands::run::execute(&args).unwrap();

    assert_eq!(stats.rows_enriched, 4);
    assert!(stats.parallel_elapsed.is_none());
    assert!(stats.sequential_elapsed.is_some());
    assert!(!fixture.path("chart.svg").exists());
}

#[test]
fn test_parallel_and_sequential_outputs_match() {
    let fixture = Fixture::new();
    let parallel_out = fixture.path("parallel.csv");
    let sequential_out = fixture.path("sequential.csv");
    for (strategy, output) in [("parallel", &parallel_out), ("sequential", &sequential_out)] {
        let mut args = fixture.run_args(&["--strategy", strategy]);
        args.output_path = output.clone();
        commands::run::execute(&args).unwrap();
    }

    assert_eq!(
        std::fs::read_to_string(&parallel_out).unwrap(),
        std::fs::read_to_string(&sequential_out).unwrap()
    );
}

#[test]
fn test_missing_ephemeris_is_fatal() {
    let fixture = Fixture::new();
    let mut args = fixture.run_args(&[]);
    args.ephemeris_path = Some(fixture.path("absent.csv"));

    let error = commands::run::execute(&args).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SigactError>(),
        Some(SigactError::EphemerisUnavailable { .. })
    ));
    assert!(format!("{:#}", error).contains("ephemeris"));
    assert!(!fixture.path("out.csv").exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let fixture = Fixture::new();
    let mut args = fixture.run_args(&[]);
    args.input_path = fixture.path("absent.csv");

    let error = commands::run::execute(&args).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SigactError>(),
        Some(SigactError::InputNotFound { .. })
    ));
}

#[test]
fn test_ephemeris_command_writes_loadable_table() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("tables").join("sun.csv");
    let args = Args::try_parse_from([
        "sigact-processor",
        "ephemeris",
        "--start",
        "2007-06-01",
        "--end",
        "2007-06-30",
        "--output",
        output.to_str().unwrap(),
        "--quiet",
    ])
    .unwrap();

    commands::run(args).unwrap();

    let ephemeris = SolarEphemeris::load(&output).unwrap();
    assert_eq!(ephemeris.len(), 30);
    assert_eq!(
        ephemeris.first_date(),
        NaiveDate::from_ymd_opt(2007, 6, 1).unwrap()
    );
}
