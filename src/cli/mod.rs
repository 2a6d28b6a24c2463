//! CLI command definitions and handlers

pub(crate) mod analyze;
mod baseline;
pub(crate) mod batch;
mod init;
mod monitor;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a batch cap (1-100)
fn parse_cap(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("cap must be at least 1".to_string())
    } else if n > 100 {
        Err("cap cannot exceed 100".to_string())
    } else {
        Ok(n)
    }
}

/// Lintsweep - safety-gated batch lint remediation
#[derive(Parser, Debug)]
#[command(name = "lintsweep")]
#[command(
    version,
    about = "Eliminate unused-code findings in bounded, transactional batches",
    long_about = "Lintsweep collects static-analysis findings, classifies each one against \
domain preservation vocabularies, and eliminates the safe ones in small batches. \
Every batch is snapshotted before mutation and validated afterwards; a failed \
validation rolls the files back byte-for-byte.",
    after_help = "\
Examples:
  lintsweep analyze .                       Collect and classify findings
  lintsweep analyze . --out findings.json   Persist the analysis for later batching
  lintsweep baseline .                      Record the current finding count
  lintsweep batch .                         Plan batches (dry run)
  lintsweep batch . --apply                 Execute batches with validation gates
  lintsweep monitor . --interval 300        Sample the finding count periodically
  lintsweep status .                        Show state, trend, and halt marker"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a lintsweep.toml config file with example settings
    Init,

    /// Run the analyzer and classify every finding
    #[command(after_help = "\
Examples:
  lintsweep analyze .                       Print the analysis as JSON
  lintsweep analyze . --out findings.json   Write JSON to a file, summary to the terminal")]
    Analyze {
        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Record the current finding count as a metrics sample
    Baseline {
        /// Finding count to record (omit to run the analyzer and count)
        #[arg(long)]
        count: Option<usize>,
    },

    /// Plan batches from classified findings and optionally execute them
    #[command(after_help = "\
Examples:
  lintsweep batch .                         Dry run: plan and report, touch nothing
  lintsweep batch . --in findings.json      Batch a previously saved analysis
  lintsweep batch . --apply                 Execute with snapshot/validate/rollback
  lintsweep batch . --apply --max-batch 5   Smaller batches for a risky cleanup")]
    Batch {
        /// Analysis file from `analyze --out` (omit to run the analyzer now)
        #[arg(long = "in", value_name = "FILE")]
        input: Option<PathBuf>,

        /// Apply the batches; without this flag nothing is mutated
        #[arg(long)]
        apply: bool,

        /// Override the per-batch finding cap
        #[arg(long, value_parser = parse_cap)]
        max_batch: Option<usize>,

        /// Override the per-batch critical-finding sub-cap
        #[arg(long, value_parser = parse_cap)]
        max_batch_critical: Option<usize>,
    },

    /// Periodically sample the finding count and raise threshold alerts
    Monitor {
        /// Seconds between samples (0 = take one sample and exit)
        #[arg(long, default_value = "300")]
        interval: u64,
    },

    /// Show state directory contents, trend, and the halt marker
    Status,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.path),

        Commands::Analyze { out } => analyze::run(&cli.path, out.as_deref()),

        Commands::Baseline { count } => baseline::run(&cli.path, count),

        Commands::Batch {
            input,
            apply,
            max_batch,
            max_batch_critical,
        } => batch::run(
            &cli.path,
            input.as_deref(),
            apply,
            max_batch,
            max_batch_critical,
        ),

        Commands::Monitor { interval } => monitor::run(&cli.path, interval),

        Commands::Status => status::run(&cli.path),
    }
}
