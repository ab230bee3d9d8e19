//! bootkit - opinionated starting point for command-line tools
//!
//! Resolves XDG-style paths, loads layered TOML configuration, and sets up
//! leveled logging before handing a runtime context to the subcommand.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    bootkit_core::logging::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
