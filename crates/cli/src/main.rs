//! envcraft CLI - inspect env files the way the envcraft loader sees them.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Initialise logging to stderr so stdout stays machine-readable.
//! - Map failures to structured exit codes.
//!
//! Does NOT handle:
//! - Parsing or interpolation logic (see the `envcraft` crate).

mod args;
mod commands;
mod error;

use args::{Cli, Commands};
use clap::Parser;
use error::ExitCodeExt;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(e.exit_code().as_i32());
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Expand {
            file,
            missing,
            lookup,
            encoding,
            output,
        } => commands::expand::run(&file, missing, lookup, encoding, output),
        Commands::Key { names, prefix } => commands::key::run(&names, &prefix),
    }
}
