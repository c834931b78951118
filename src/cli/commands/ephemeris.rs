//! Ephemeris command: generate the daily solar position table

use crate::cli::args::EphemerisArgs;
use crate::ephemeris::SolarEphemeris;
use anyhow::{Context, Result};
use colored::*;
use tracing::info;

pub fn execute(args: &EphemerisArgs) -> Result<()> {
    let output_path = args.get_output_path()?;
    info!(
        "Generating solar ephemeris {} .. {} into {}",
        args.start,
        args.end,
        output_path.display()
    );

    let ephemeris = SolarEphemeris::generate(args.start, args.end)
        .context("Failed to generate solar ephemeris")?;
    ephemeris
        .write_csv(&output_path)
        .with_context(|| format!("Failed to write ephemeris to {}", output_path.display()))?;

    if !args.quiet {
        println!(
            "{} {} daily positions ({} .. {}) to {}",
            "Wrote".bright_green().bold(),
            ephemeris.len().to_string().bright_white().bold(),
            ephemeris.first_date(),
            ephemeris.last_date(),
            output_path.display()
        );
    }
    Ok(())
}
