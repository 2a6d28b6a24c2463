//! Analyze command - collect findings and classify every one

use anyhow::{Context, Result};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::classifier;
use crate::config::ProjectConfig;
use crate::models::{ClassificationResult, Finding};
use crate::tools::CommandAnalyzer;
use crate::{collector, state};

/// Findings plus their classifications, as written by `analyze --out` and
/// consumed by `batch --in`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub findings: Vec<Finding>,
    pub classifications: Vec<ClassificationResult>,
}

/// Collect findings for the whole repository and classify each one against
/// the content of its file.
pub(crate) fn collect_and_classify(
    repo_path: &Path,
    config: &ProjectConfig,
) -> Result<AnalysisDocument> {
    let analyzer = CommandAnalyzer::new(
        config.tools.analyzer.clone(),
        config.tools.timeout_secs,
        repo_path,
    );
    let findings = collector::collect(&analyzer, repo_path, repo_path, &config.collector);

    let classifications = findings
        .iter()
        .map(|finding| {
            let content =
                std::fs::read_to_string(repo_path.join(&finding.file_path)).unwrap_or_default();
            classifier::classify(finding, &content, &config.preserve)
        })
        .collect();

    Ok(AnalysisDocument {
        findings,
        classifications,
    })
}

/// Load a saved analysis document.
pub(crate) fn load_document(path: &Path) -> Result<AnalysisDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading analysis file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing analysis file {}", path.display()))
}

/// Run the analyze command
pub fn run(path: &Path, out: Option<&Path>) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let config = ProjectConfig::load(&repo_path);
    let doc = collect_and_classify(&repo_path, &config)?;
    info!("Classified {} findings", doc.findings.len());

    let json = serde_json::to_string_pretty(&doc)?;
    match out {
        Some(out_path) => {
            std::fs::write(out_path, &json)
                .with_context(|| format!("writing {}", out_path.display()))?;
            print_summary(&doc);
            println!(
                "\n{} Analysis written to {}",
                style("✓").green(),
                style(out_path.display()).cyan()
            );
            println!(
                "  Next: {}",
                style(format!("lintsweep batch . --in {}", out_path.display())).cyan()
            );
        }
        None => println!("{json}"),
    }

    // Keep the state dir around once a repo is being analyzed
    let _ = state::ensure_state_dir(&repo_path);
    Ok(())
}

fn print_summary(doc: &AnalysisDocument) {
    let preserved = doc
        .classifications
        .iter()
        .filter(|c| c.should_preserve)
        .count();
    let review = doc
        .classifications
        .iter()
        .filter(|c| !c.should_preserve && c.review_required)
        .count();
    let eligible = doc
        .classifications
        .iter()
        .filter(|c| c.eligible_for_batch())
        .count();

    println!("\n{}", style("Lintsweep Analysis").bold());
    println!(
        "{}",
        style("──────────────────────────────────────").dim()
    );
    println!(
        "Findings: {}  Eligible: {}  Preserved: {}  Review: {}",
        style(doc.findings.len()).bold(),
        style(eligible).green(),
        style(preserved).yellow(),
        style(review).yellow()
    );
}
