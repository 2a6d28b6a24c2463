//! Monitor command - periodic finding-count sampling with alerts

use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::ProjectConfig;
use crate::ledger::Ledger;
use crate::models::{AlertLevel, Trend};
use crate::tools::CommandAnalyzer;
use crate::collector;

/// Run the monitor command. `interval = 0` takes a single sample and exits;
/// otherwise it loops until interrupted.
pub fn run(path: &Path, interval: u64) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let config = ProjectConfig::load(&repo_path);
    let ledger = Ledger::new(&repo_path, config.alerts.clone());
    let analyzer = CommandAnalyzer::new(
        config.tools.analyzer.clone(),
        config.tools.timeout_secs,
        &repo_path,
    );

    if interval > 0 {
        info!("Monitoring every {}s; Ctrl-C to stop", interval);
    }

    loop {
        let count = collector::collect(&analyzer, &repo_path, &repo_path, &config.collector).len();
        ledger.record_sample(count)?;

        let trend = ledger.compute_trend();
        let level = ledger.evaluate_alert_level(count);
        println!(
            "{}  findings={}  level={}  trend={}",
            style(Utc::now().format("%Y-%m-%d %H:%M:%S")).dim(),
            style(count).bold(),
            level_label(level),
            trend_label(trend)
        );

        if let Some(alert) = ledger.maybe_alert(count) {
            println!(
                "{} [{}] {}",
                style("ALERT").red().bold(),
                alert.severity,
                alert.message
            );
        }

        if interval == 0 {
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn level_label(level: AlertLevel) -> String {
    match level {
        AlertLevel::Green => style("green").green().to_string(),
        AlertLevel::Yellow => style("yellow").yellow().to_string(),
        AlertLevel::Orange => style("orange").yellow().bold().to_string(),
        AlertLevel::Red => style("red").red().bold().to_string(),
    }
}

fn trend_label(trend: Trend) -> String {
    match trend {
        Trend::Increasing => style("increasing").red().to_string(),
        Trend::Decreasing => style("decreasing").green().to_string(),
        Trend::Stable => style("stable").dim().to_string(),
    }
}
