//! Catconv CLI: the `catconv` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "catconv=warn";

fn main() {
    // Logs go to stderr; stdout carries only JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog {
            source,
            destination,
            options,
            ids,
            json,
        } => commands::catalog::run(commands::catalog::Args {
            source,
            destination,
            options,
            ids,
            json,
        }),

        Commands::Share {
            source,
            destination,
            json,
        } => commands::share::run(source, destination, json),

        Commands::Member {
            source,
            options,
            json,
        } => commands::member::run(source, options, json),

        Commands::Types { json } => commands::types::run(json),
    }
}
