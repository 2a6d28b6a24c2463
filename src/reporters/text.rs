//! Text (terminal) reporter

use anyhow::Result;
use console::style;

use crate::models::{Outcome, Trend};
use crate::reporters::{FindingRef, RunReport};

/// Render a run report as formatted terminal output
pub fn render(report: &RunReport) -> Result<String> {
    let mut out = String::new();

    let mode = if report.dry_run {
        style("dry run").yellow().to_string()
    } else {
        style("apply").green().to_string()
    };
    out.push_str(&format!(
        "\n{} ({})\n",
        style("Lintsweep Batch Run").bold(),
        mode
    ));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));

    out.push_str(&format!(
        "Findings: {} before, {} after  Trend: {}\n\n",
        style(report.before_count).bold(),
        style(report.after_count).bold(),
        trend_label(report.trend)
    ));

    // Per-domain breakdown
    out.push_str(&format!("{}\n", style("DOMAINS").bold()));
    for (domain, count) in &report.domains {
        out.push_str(&format!("  {:<14} {}\n", domain, count));
    }
    out.push('\n');

    push_list(&mut out, "COMMITTED", &report.committed);
    push_list(&mut out, "ROLLED BACK", &report.rolled_back);
    push_list(&mut out, "PRESERVED", &report.preserved);
    push_list(&mut out, "NEEDS REVIEW", &report.review);

    for record in &report.records {
        let outcome = match record.outcome {
            Outcome::Committed => style("committed").green(),
            Outcome::RolledBack => style("rolled-back").yellow(),
            Outcome::ManualInterventionRequired => {
                style("manual-intervention-required").red().bold()
            }
        };
        out.push_str(&format!(
            "batch {}  {}  {}ms\n",
            style(&record.batch_id[..record.batch_id.len().min(8)]).dim(),
            outcome,
            record.duration_ms
        ));
        for gate in &record.validation_reports {
            let mark = if gate.passed {
                style("ok").green().to_string()
            } else {
                style("FAIL").red().to_string()
            };
            out.push_str(&format!("  {:<24} {}\n", gate.gate.to_string(), mark));
            for issue in gate.issues.iter().take(3) {
                out.push_str(&format!("    {}\n", style(issue).dim()));
            }
        }
    }

    if report.overall_outcome() == Some(Outcome::ManualInterventionRequired) {
        out.push_str(&format!(
            "\n{}\n",
            style("Rollback failed. Restore from the backup directory, then clear the halt marker.")
                .red()
        ));
    }

    Ok(out)
}

fn trend_label(trend: Trend) -> String {
    match trend {
        Trend::Increasing => style("increasing").red().to_string(),
        Trend::Decreasing => style("decreasing").green().to_string(),
        Trend::Stable => style("stable").dim().to_string(),
    }
}

fn push_list(out: &mut String, title: &str, refs: &[FindingRef]) {
    if refs.is_empty() {
        return;
    }
    out.push_str(&format!("{} ({})\n", style(title).bold(), refs.len()));
    for r in refs.iter().take(15) {
        let subject = if r.subject.is_empty() {
            r.rule_id.as_str()
        } else {
            r.subject.as_str()
        };
        out.push_str(&format!(
            "  {:<28} {}\n",
            subject,
            style(format!("{}:{}", r.file.display(), r.line)).dim()
        ));
    }
    let remaining = refs.len().saturating_sub(15);
    if remaining > 0 {
        out.push_str(&format!("  {}\n", style(format!("...and {} more", remaining)).dim()));
    }
    out.push('\n');
}
