//! Discog Mediator command-line entry point.

use clap::Parser;
use discog_mediator::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("discog_mediator=info".parse()?))
        .init();

    cli::run_command(&args)
}
