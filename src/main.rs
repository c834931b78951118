use clap::Parser;
use sigact_processor::cli::{
    args::Args,
    commands::{self, shared::setup_logging},
};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = &args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    if let Err(error) = setup_logging(command) {
        eprintln!("Failed to initialise logging: {:#}", error);
        process::exit(1);
    }

    if let Err(error) = commands::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SIGACT Processor - Incident Daylight Enrichment");
    println!("===============================================");
    println!();
    println!("Resolve MGRS grid references to coordinates, flag whether each incident");
    println!("happened in daylight, and compare parallel against sequential execution.");
    println!();
    println!("USAGE:");
    println!("    sigact-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run         Enrich an incident CSV and benchmark the strategies");
    println!("    ephemeris   Generate the solar ephemeris table (run once first)");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Generate the default ephemeris (1990-2030):");
    println!("    sigact-processor ephemeris");
    println!();
    println!("    # Enrich and benchmark with 6 workers and 500 partitions:");
    println!("    sigact-processor run sigacts.csv --workers 6 --partitions 500");
    println!();
    println!("    # Parallel only, no preparation, custom output:");
    println!("    sigact-processor run raw.csv --strategy parallel --no-prepare -o out.csv");
    println!();
    println!("For detailed help on any command, use:");
    println!("    sigact-processor <COMMAND> --help");
}
