//! Shared components for CLI commands

use crate::cli::args::Commands;
use crate::models::ProcessingStats;
use anyhow::Result;
use colored::*;
use std::time::Duration;
use tracing::debug;

/// Set up structured logging for the selected command
pub fn setup_logging(command: &Commands) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = command.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sigact_processor={}", log_level)));

    if command.is_quiet() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} s", elapsed.as_secs_f64())
}

/// Print the row accounting and timings of a run
pub fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  Rows read:              {}",
        stats.rows_read.to_string().bright_white().bold()
    );
    println!("  Rows after preparation: {}", stats.rows_prepared);
    if stats.invalid_timestamps > 0 {
        println!(
            "  Invalid timestamps:     {}",
            stats.invalid_timestamps.to_string().bright_red().bold()
        );
    }
    if stats.unresolved_coordinates > 0 {
        println!(
            "  Unresolved grid refs:   {}",
            stats.unresolved_coordinates.to_string().bright_red().bold()
        );
    }
    println!(
        "  Rows enriched:          {}",
        stats.rows_enriched.to_string().bright_white().bold()
    );
    println!("  Daylight incidents:     {}", stats.daylight_rows);
    if stats.unknown_daylight > 0 {
        println!(
            "  Unknown daylight:       {}",
            stats.unknown_daylight.to_string().bright_yellow()
        );
    }
    if let Some(elapsed) = stats.parallel_elapsed {
        println!("  Parallel pass:          {}", format_elapsed(elapsed));
    }
    if let Some(elapsed) = stats.sequential_elapsed {
        println!("  Sequential pass:        {}", format_elapsed(elapsed));
    }
}
