//! Command implementations for the SIGACT processor CLI
//!
//! Each subcommand lives in its own module:
//! - `run`: dataset enrichment and strategy benchmark
//! - `ephemeris`: solar ephemeris table generation

pub mod ephemeris;
pub mod run;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Dispatch to the subcommand handler; `None` when no subcommand was given
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Run(run_args)) => {
            let stats = run::execute(&run_args)?;
            if !run_args.quiet {
                shared::print_summary(&stats);
            }
            Ok(())
        }
        Some(Commands::Ephemeris(ephemeris_args)) => ephemeris::execute(&ephemeris_args),
        None => Ok(()),
    }
}
