use clap::Parser;
use fibext::cli::{Cli, run};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> std::process::ExitCode {
    // Diagnostics go to stderr; stdout carries only the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fibext=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    run(Cli::parse())
}
