//! Lintsweep - safety-gated batch lint remediation
//!
//! Collects static-analysis findings, classifies them against domain
//! preservation vocabularies, and eliminates the safe ones in bounded,
//! transactional batches.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lintsweep::cli;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
