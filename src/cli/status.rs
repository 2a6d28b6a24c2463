//! Status command - state directory overview

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::ledger::Ledger;
use crate::ratelimit::RateLimiter;
use crate::state;

/// Run the status command
pub fn run(path: &Path) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let config = ProjectConfig::load(&repo_path);

    println!("\n{}", style("Lintsweep Status").bold());
    println!(
        "{}",
        style("──────────────────────────────────────").dim()
    );

    let config_path = repo_path.join(ProjectConfig::FILENAME);
    let config_status = if config_path.exists() {
        style("found").green().to_string()
    } else {
        style("not found (using defaults)").dim().to_string()
    };
    println!("Config:    {} {}", config_path.display(), config_status);

    let state_dir = state::state_dir(&repo_path);
    if !state_dir.exists() {
        println!(
            "State:     {} {}\n",
            state_dir.display(),
            style("not initialized").dim()
        );
        return Ok(());
    }
    println!("State:     {}", state_dir.display());
    println!(
        "Backups:   {}   Reports: {}",
        count_entries(&state::state_dir(&repo_path).join("backups")),
        count_entries(&state::reports_dir(&repo_path))
    );

    if state::is_halted(&repo_path) {
        let detail = std::fs::read_to_string(state::manual_intervention_path(&repo_path))
            .unwrap_or_default();
        println!(
            "\n{} {}",
            style("HALTED:").red().bold(),
            detail.trim()
        );
        println!(
            "Restore the affected files from the backup directory, then delete {}.",
            state::manual_intervention_path(&repo_path).display()
        );
    } else {
        println!("Halted:    no");
    }

    let ledger = Ledger::new(&repo_path, config.alerts.clone());
    match ledger.latest() {
        Some(sample) => {
            let level = ledger.evaluate_alert_level(sample.unused_count);
            println!(
                "\nFindings:  {} (sampled {})",
                style(sample.unused_count).bold(),
                style(sample.timestamp.format("%Y-%m-%d %H:%M:%S")).dim()
            );
            println!("Level:     {}   Trend: {:?}", level, ledger.compute_trend());
        }
        None => println!("\nFindings:  {}", style("no samples recorded").dim()),
    }

    let limiter = RateLimiter::new(&repo_path, config.rate_limit);
    let decision = limiter.check_allowed();
    let gate = if decision.allowed {
        style("open").green().to_string()
    } else {
        style(decision.reason.as_str()).yellow().to_string()
    };
    println!("Rate gate: {}\n", gate);

    Ok(())
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
