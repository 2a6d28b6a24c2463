//! Output reporters for batch run results
//!
//! Two formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON, also persisted under the state dir

mod json;
mod text;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::{
    ClassificationResult, ExecutionRecord, Finding, Outcome, Trend,
};
use crate::state;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A finding as it appears in report lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingRef {
    pub id: String,
    pub file: PathBuf,
    pub line: u32,
    pub rule_id: String,
    pub subject: String,
}

impl FindingRef {
    fn from(finding: &Finding) -> Self {
        Self {
            id: finding.id.clone(),
            file: finding.file_path.clone(),
            line: finding.line,
            rule_id: finding.rule_id.clone(),
            subject: finding.subject_name.clone(),
        }
    }
}

/// Full record of one `batch` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
    pub before_count: usize,
    pub after_count: usize,
    /// Findings per classified domain
    pub domains: BTreeMap<String, usize>,
    pub committed: Vec<FindingRef>,
    pub rolled_back: Vec<FindingRef>,
    pub preserved: Vec<FindingRef>,
    pub review: Vec<FindingRef>,
    pub records: Vec<ExecutionRecord>,
    pub trend: Trend,
}

impl RunReport {
    /// Assemble a report from the pipeline's outputs.
    ///
    /// `outcomes` carries, for each executed batch, its findings paired
    /// with the terminal outcome. Preserved and review-required findings
    /// never reach the executor and are listed from the classifications.
    pub fn build(
        dry_run: bool,
        findings: &[Finding],
        classifications: &[ClassificationResult],
        outcomes: &[(Vec<Finding>, Outcome)],
        records: Vec<ExecutionRecord>,
        trend: Trend,
    ) -> Self {
        let mut domains: BTreeMap<String, usize> = BTreeMap::new();
        let mut preserved = Vec::new();
        let mut review = Vec::new();

        let by_id: BTreeMap<&str, &Finding> =
            findings.iter().map(|f| (f.id.as_str(), f)).collect();

        for c in classifications {
            *domains.entry(c.domain.to_string()).or_insert(0) += 1;
            let Some(finding) = by_id.get(c.finding_id.as_str()) else {
                continue;
            };
            if c.should_preserve {
                preserved.push(FindingRef::from(finding));
            } else if c.review_required {
                review.push(FindingRef::from(finding));
            }
        }

        let mut committed = Vec::new();
        let mut rolled_back = Vec::new();
        for (batch_findings, outcome) in outcomes {
            let refs = batch_findings.iter().map(FindingRef::from);
            match outcome {
                Outcome::Committed => committed.extend(refs),
                Outcome::RolledBack | Outcome::ManualInterventionRequired => {
                    rolled_back.extend(refs)
                }
            }
        }

        let before_count = findings.len();
        let after_count = before_count.saturating_sub(committed.len());

        Self {
            timestamp: Utc::now(),
            dry_run,
            before_count,
            after_count,
            domains,
            committed,
            rolled_back,
            preserved,
            review,
            records,
            trend,
        }
    }

    /// Worst terminal outcome across all executed batches, if any ran.
    pub fn overall_outcome(&self) -> Option<Outcome> {
        if self
            .records
            .iter()
            .any(|r| r.outcome == Outcome::ManualInterventionRequired)
        {
            Some(Outcome::ManualInterventionRequired)
        } else if self.records.iter().any(|r| r.outcome == Outcome::RolledBack) {
            Some(Outcome::RolledBack)
        } else if !self.records.is_empty() {
            Some(Outcome::Committed)
        } else {
            None
        }
    }
}

/// Render a run report in the specified format
pub fn report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

/// Persist the JSON rendition under `.lintsweep/reports/`.
pub fn write_report(repo_path: &Path, report: &RunReport) -> Result<PathBuf> {
    let dir = state::reports_dir(repo_path);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let name = format!("run-{}.json", report.timestamp.format("%Y%m%d-%H%M%S"));
    let path = dir.join(name);
    std::fs::write(&path, json::render(report)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{deterministic_finding_id, Domain, FindingCategory, Gate, ValidationReport};

    fn finding(subject: &str, file: &str, line: u32) -> Finding {
        Finding {
            id: deterministic_finding_id("no-unused-vars", file, line, subject),
            file_path: PathBuf::from(file),
            line,
            column: 1,
            rule_id: "no-unused-vars".into(),
            message: format!("'{}' is defined but never used.", subject),
            subject_name: subject.into(),
            category: FindingCategory::UnusedVariable,
        }
    }

    fn classification(
        finding: &Finding,
        domain: Domain,
        should_preserve: bool,
        review_required: bool,
    ) -> ClassificationResult {
        ClassificationResult {
            finding_id: finding.id.clone(),
            should_preserve,
            domain,
            confidence: 0.9,
            reason: "test".into(),
            matched_pattern: None,
            review_required,
        }
    }

    /// A run where one batch committed, one was rolled back, and one
    /// finding each was preserved and held for review.
    pub(crate) fn test_report() -> RunReport {
        let committed = finding("tempCounter", "src/utils/scratch.ts", 3);
        let rolled = finding("oldHelper", "src/utils/legacy.ts", 8);
        let kept = finding("planetaryPosition", "src/calc/positions.ts", 12);
        let ambiguous = finding("MAX_RETRIES", "src/net/client.ts", 2);

        let findings = vec![
            committed.clone(),
            rolled.clone(),
            kept.clone(),
            ambiguous.clone(),
        ];
        let classifications = vec![
            classification(&committed, Domain::Generic, false, false),
            classification(&rolled, Domain::Generic, false, false),
            classification(&kept, Domain::Astrological, true, false),
            classification(&ambiguous, Domain::Generic, false, true),
        ];
        let outcomes = vec![
            (vec![committed], Outcome::Committed),
            (vec![rolled], Outcome::RolledBack),
        ];
        let records = vec![
            ExecutionRecord {
                batch_id: "b1".into(),
                outcome: Outcome::Committed,
                duration_ms: 40,
                validation_reports: vec![ValidationReport {
                    gate: Gate::CompileCheck,
                    passed: true,
                    issues: vec![],
                }],
                timestamp: Utc::now(),
            },
            ExecutionRecord {
                batch_id: "b2".into(),
                outcome: Outcome::RolledBack,
                duration_ms: 55,
                validation_reports: vec![ValidationReport {
                    gate: Gate::CompileCheck,
                    passed: false,
                    issues: vec!["TS2304: Cannot find name 'oldHelper'".into()],
                }],
                timestamp: Utc::now(),
            },
        ];

        RunReport::build(
            false,
            &findings,
            &classifications,
            &outcomes,
            records,
            Trend::Decreasing,
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_build_sorts_findings_into_lists() {
        let report = test_report();
        assert_eq!(report.before_count, 4);
        assert_eq!(report.after_count, 3);
        assert_eq!(report.committed.len(), 1);
        assert_eq!(report.rolled_back.len(), 1);
        assert_eq!(report.preserved.len(), 1);
        assert_eq!(report.review.len(), 1);
        assert_eq!(report.domains["astrological"], 1);
        assert_eq!(report.domains["generic"], 3);
    }

    #[test]
    fn test_overall_outcome_worst_wins() {
        let mut report = test_report();
        assert_eq!(report.overall_outcome(), Some(Outcome::RolledBack));

        report.records[1].outcome = Outcome::ManualInterventionRequired;
        assert_eq!(
            report.overall_outcome(),
            Some(Outcome::ManualInterventionRequired)
        );

        report.records.clear();
        assert_eq!(report.overall_outcome(), None);
    }

    #[test]
    fn test_write_report_lands_in_reports_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_report(dir.path(), &test_report()).expect("write");
        assert!(path.starts_with(state::reports_dir(dir.path())));
        let content = std::fs::read_to_string(path).expect("read back");
        assert!(content.contains("\"before_count\": 4"));
    }
}
