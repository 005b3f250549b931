//! Geolearn CLI binary.

use std::process;

use clap::Parser;
use geolearn::cli::{args::GeolearnArgs, commands::execute_command};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = GeolearnArgs::parse();

    // RUST_LOG wins; otherwise derive the filter from the verbosity flags.
    let default_level = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geolearn={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
