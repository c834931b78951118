//! Run command: enrich an incident table and benchmark the strategies
//!
//! Workflow:
//! 1. Validate configuration and load the shared ephemeris
//! 2. Read and prepare the incident table
//! 3. Extract records and resolve grid references (unresolved rows are dropped)
//! 4. Enrich with the selected strategy, or benchmark both
//! 5. Write the enriched table and the comparison chart

use crate::cli::args::RunArgs;
use crate::config::SystemProfile;
use crate::dataset::IncidentTable;
use crate::enrichment::{RecordEnricher, locate_all};
use crate::ephemeris::SolarEphemeris;
use crate::models::{BatchOutcome, ProcessingStats, Strategy};
use crate::processor::BatchExecutor;
use crate::report::BenchmarkReport;
use anyhow::{Context, Result};
use colored::*;
use std::sync::Arc;
use tracing::{debug, info};

pub fn execute(args: &RunArgs) -> Result<ProcessingStats> {
    info!("Starting SIGACT daylight enrichment");
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config();
    config.validate()?;
    let profile = SystemProfile::detect();
    debug!(
        "Host has {} logical / {} physical cores ({})",
        profile.cpu_cores,
        profile.physical_cores,
        profile.cpu_brand.as_deref().unwrap_or("unknown CPU")
    );

    let ephemeris_path = args.get_ephemeris_path()?;
    let ephemeris = SolarEphemeris::load(&ephemeris_path).with_context(|| {
        format!(
            "Failed to load solar ephemeris from {} (generate one with the `ephemeris` command)",
            ephemeris_path.display()
        )
    })?;
    let ephemeris = Arc::new(ephemeris);

    let mut stats = ProcessingStats::default();

    let table = IncidentTable::read_csv(&args.input_path)
        .with_context(|| format!("Failed to read {}", args.input_path.display()))?;
    stats.rows_read = table.height();

    let table = table
        .prepare(&config.preprocess)
        .context("Failed to prepare incident table")?;
    stats.rows_prepared = table.height();

    let extraction = table
        .records(&config.columns)
        .context("Failed to extract incident records")?;
    stats.invalid_timestamps = extraction.invalid_timestamps.len();

    let located = locate_all(extraction.records);
    stats.unresolved_coordinates = located.unresolved.len();
    let incidents = located.located;

    let enricher = Arc::new(RecordEnricher::new(ephemeris, config.solar.clone()));
    let executor = BatchExecutor::new(enricher, &config);

    let enriched: BatchOutcome = match args.strategy.single() {
        Some(strategy) => {
            let outcome = executor.run(&incidents, strategy)?;
            match strategy {
                Strategy::Parallel => stats.parallel_elapsed = Some(outcome.elapsed),
                Strategy::Sequential => stats.sequential_elapsed = Some(outcome.elapsed),
            }
            outcome
        }
        None => {
            let run = executor.benchmark(&incidents)?;
            stats.parallel_elapsed = Some(run.parallel.elapsed);
            stats.sequential_elapsed = Some(run.sequential.elapsed);

            let report = BenchmarkReport::from_run(&run, &profile);
            if !args.quiet {
                print!("{}", report.render_terminal());
            }
            report.write_svg(&args.chart_path)?;
            if !args.quiet {
                println!(
                    "{} {}",
                    "Chart saved to".bright_green(),
                    args.chart_path.display()
                );
            }
            run.parallel
        }
    };

    stats.unknown_daylight = enriched.unknown_count();
    stats.daylight_rows = enriched.daylight_count();
    stats.rows_enriched = table
        .write_enriched(&enriched.enriched, &args.output_path)
        .with_context(|| format!("Failed to write {}", args.output_path.display()))?;

    info!(
        "Enriched {} of {} rows ({} dropped)",
        stats.rows_enriched,
        stats.rows_read,
        stats.rows_dropped()
    );
    Ok(stats)
}
