//! Baseline command - record the current finding count

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::ledger::Ledger;
use crate::tools::CommandAnalyzer;
use crate::collector;

/// Run the baseline command
pub fn run(path: &Path, count: Option<usize>) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let config = ProjectConfig::load(&repo_path);
    let count = match count {
        Some(n) => n,
        None => {
            let analyzer = CommandAnalyzer::new(
                config.tools.analyzer.clone(),
                config.tools.timeout_secs,
                &repo_path,
            );
            collector::collect(&analyzer, &repo_path, &repo_path, &config.collector).len()
        }
    };

    let ledger = Ledger::new(&repo_path, config.alerts);
    ledger.record_baseline(count)?;

    let level = ledger.evaluate_alert_level(count);
    println!(
        "{} Baseline recorded: {} findings (level {})",
        style("✓").green(),
        style(count).bold(),
        level
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertConfig;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_count_recorded() {
        let dir = tempdir().expect("tempdir");
        run(dir.path(), Some(42)).expect("baseline");

        let ledger = Ledger::new(
            &dir.path().canonicalize().expect("canonicalize"),
            AlertConfig::default(),
        );
        assert_eq!(ledger.latest().expect("sample").unused_count, 42);
    }
}
