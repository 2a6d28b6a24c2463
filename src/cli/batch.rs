//! Batch command - plan batches and, with --apply, execute them

use anyhow::{Context, Result};
use console::style;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::analyze;
use crate::config::ProjectConfig;
use crate::executor::{self, Executor};
use crate::ledger::Ledger;
use crate::models::{ClassificationResult, Finding, Outcome};
use crate::ratelimit::RateLimiter;
use crate::reporters::{self, OutputFormat, RunReport};
use crate::tools::CommandTypeChecker;
use crate::{planner, state};

/// Run the batch command
pub fn run(
    path: &Path,
    input: Option<&Path>,
    apply: bool,
    max_batch: Option<usize>,
    max_batch_critical: Option<usize>,
) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if state::is_halted(&repo_path) {
        let detail = std::fs::read_to_string(state::manual_intervention_path(&repo_path))
            .unwrap_or_default();
        anyhow::bail!(
            "Automated batches are halted: a previous rollback failed.\n{}\n\
             Restore the files from {} and delete the {} marker to resume.",
            detail.trim(),
            state::backup_dir(&repo_path, "<timestamp>").display(),
            state::MANUAL_INTERVENTION_MARKER
        );
    }

    // An interrupted transaction is resolved before anything else runs,
    // even on a dry run: the files on disk are not trustworthy until the
    // previous batch's rollback completes.
    if let Some(marker) = executor::resume_interrupted(&repo_path)? {
        println!(
            "{} batch {} was interrupted; restored {} file(s) from snapshots.",
            style("Recovered:").yellow().bold(),
            marker.batch_id,
            marker.files.len()
        );
    }

    let mut config = ProjectConfig::load(&repo_path);
    if let Some(cap) = max_batch {
        config.batch.max_total = cap;
    }
    if let Some(cap) = max_batch_critical {
        config.batch.max_critical = cap;
    }

    let doc = match input {
        Some(file) => analyze::load_document(file)?,
        None => analyze::collect_and_classify(&repo_path, &config)?,
    };

    let by_id: HashMap<String, ClassificationResult> = doc
        .classifications
        .iter()
        .map(|c| (c.finding_id.clone(), c.clone()))
        .collect();
    let batches = planner::plan(&doc.findings, &by_id, &config.batch);
    info!(
        "Planned {} batches from {} findings",
        batches.len(),
        doc.findings.len()
    );

    let ledger = Ledger::new(&repo_path, config.alerts.clone());
    let mut outcomes: Vec<(Vec<Finding>, Outcome)> = Vec::new();
    let mut records = Vec::new();

    if apply {
        let limiter = RateLimiter::new(&repo_path, config.rate_limit.clone());
        let type_checker = CommandTypeChecker::new(
            config.tools.type_check.clone(),
            config.tools.timeout_secs,
            &repo_path,
        );
        let executor = Executor::new(
            &repo_path,
            &type_checker,
            &config.preserve.protected_identifiers,
        );

        let mut committed = 0usize;
        for batch in &batches {
            let decision = limiter.check_allowed();
            if !decision.allowed {
                warn!("Rate limiter refused execution: {}", decision.reason);
                println!(
                    "{} {}",
                    style("Stopping:").yellow().bold(),
                    decision.reason
                );
                break;
            }

            let record = executor.execute(batch)?;
            limiter.record_execution()?;

            if record.outcome == Outcome::Committed {
                committed += batch.findings.len();
            }
            let remaining = doc.findings.len().saturating_sub(committed);
            ledger.record_batch(&record, remaining)?;

            let outcome = record.outcome;
            outcomes.push((batch.findings.clone(), outcome));
            records.push(record);

            // One failed batch is a signal, not a race to finish: leave the
            // remaining batches for a later run.
            if outcome != Outcome::Committed {
                warn!("Batch ended {}; deferring remaining batches", outcome);
                break;
            }
        }
    } else {
        println!(
            "{} {} batches planned; re-run with {} to execute.",
            style("Dry run:").yellow().bold(),
            batches.len(),
            style("--apply").cyan()
        );
    }

    let report = RunReport::build(
        !apply,
        &doc.findings,
        &doc.classifications,
        &outcomes,
        records,
        ledger.compute_trend(),
    );

    print!("{}", reporters::report(&report, OutputFormat::Text)?);
    // Only applied runs persist a report; a dry run leaves no trace.
    if apply {
        let report_path = reporters::write_report(&repo_path, &report)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            style(report_path.display()).cyan()
        );
    }

    if let Some(alert) = ledger.maybe_alert(report.after_count) {
        println!(
            "{} [{}] {}",
            style("ALERT").red().bold(),
            alert.severity,
            alert.message
        );
    }

    if report.overall_outcome() == Some(Outcome::ManualInterventionRequired) {
        anyhow::bail!(
            "Rollback failed; automated batches are halted. See {}",
            state::manual_intervention_path(&repo_path).display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::analyze::AnalysisDocument;
    use tempfile::tempdir;

    #[test]
    fn test_refuses_while_halted() {
        let dir = tempdir().expect("tempdir");
        state::set_halted(dir.path(), "batch b9: failed to restore src/a.ts").expect("halt");

        let err = run(dir.path(), None, true, None, None).expect_err("must refuse");
        assert!(err.to_string().contains("halted"));
    }

    #[test]
    fn test_dry_run_with_saved_analysis_touches_nothing() {
        let dir = tempdir().expect("tempdir");
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");
        let file = src.join("a.ts");
        std::fs::write(&file, "const tempCounter = 1;\n").expect("write");

        let doc = AnalysisDocument {
            findings: vec![crate::models::Finding {
                id: "f1".into(),
                file_path: "src/a.ts".into(),
                line: 1,
                column: 7,
                rule_id: "no-unused-vars".into(),
                message: "'tempCounter' is assigned a value but never used.".into(),
                subject_name: "tempCounter".into(),
                category: crate::models::FindingCategory::UnusedVariable,
            }],
            classifications: vec![ClassificationResult {
                finding_id: "f1".into(),
                should_preserve: false,
                domain: crate::models::Domain::Generic,
                confidence: 0.3,
                reason: "no pattern matched".into(),
                matched_pattern: None,
                review_required: false,
            }],
        };
        let analysis = dir.path().join("analysis.json");
        std::fs::write(&analysis, serde_json::to_string(&doc).expect("json")).expect("write");

        run(dir.path(), Some(&analysis), false, None, None).expect("dry run");

        // Source untouched, nothing persisted
        let content = std::fs::read_to_string(&file).expect("read");
        assert_eq!(content, "const tempCounter = 1;\n");
        assert!(!state::reports_dir(dir.path()).exists());
        assert!(!state::state_dir(dir.path()).exists());
    }

    #[test]
    fn test_interrupted_transaction_restored_before_planning() {
        let dir = tempdir().expect("tempdir");
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");
        let file = src.join("a.ts");
        std::fs::write(&file, "half-applied edit\n").expect("write");

        // Snapshot and marker left behind by an interrupted run
        let timestamp_id = "20260823-000000-deadbeef";
        let backup = state::backup_dir(dir.path(), timestamp_id).join("src/a.ts");
        std::fs::create_dir_all(backup.parent().unwrap()).expect("mkdir");
        std::fs::write(&backup, "const tempCounter = 1;\n").expect("write backup");
        let marker = crate::executor::InFlightMarker {
            batch_id: "deadbeef-0001".into(),
            timestamp_id: timestamp_id.into(),
            files: vec!["src/a.ts".into()],
            started_at: chrono::Utc::now(),
        };
        std::fs::write(
            state::in_flight_path(dir.path()),
            serde_json::to_string(&marker).expect("json"),
        )
        .expect("write marker");

        let doc = AnalysisDocument {
            findings: Vec::new(),
            classifications: Vec::new(),
        };
        let analysis = dir.path().join("analysis.json");
        std::fs::write(&analysis, serde_json::to_string(&doc).expect("json")).expect("write");

        run(dir.path(), Some(&analysis), false, None, None).expect("dry run");

        let content = std::fs::read_to_string(&file).expect("read");
        assert_eq!(content, "const tempCounter = 1;\n");
        assert!(!state::in_flight_path(dir.path()).exists());
    }
}
