//! Core data models for lintsweep
//!
//! These models flow through the whole pipeline: findings come out of the
//! collector, classifications out of the classifier, batches out of the
//! planner, and execution records out of the executor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Generate a deterministic finding ID based on content hash.
///
/// Findings keep stable IDs across runs, enabling:
/// - Tracking a finding over repeated collect() calls
/// - Matching classifications to findings by ID
/// - Reliable deduplication in reports
///
/// The ID is a 16-character hex string derived from hashing the rule,
/// location, and subject name. DefaultHasher is intentionally not used:
/// it is not stable across Rust versions.
pub fn deterministic_finding_id(rule_id: &str, file: &str, line: u32, subject: &str) -> String {
    let input = format!("{rule_id}\n{file}\n{line}\n{subject}");
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Categories a finding's rule can fall into
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    UnusedImport,
    UnusedVariable,
    Formatting,
    TypeSafety,
    #[default]
    Other,
}

impl FindingCategory {
    /// Map an analyzer rule id to a category.
    pub fn from_rule_id(rule_id: &str) -> Self {
        let rule = rule_id.to_ascii_lowercase();
        if rule.contains("unused-import") || rule.ends_with("no-unused-modules") {
            FindingCategory::UnusedImport
        } else if rule.contains("no-unused-vars") || rule.contains("unused-variable") {
            FindingCategory::UnusedVariable
        } else if rule.contains("await-thenable")
            || rule.contains("no-floating-promises")
            || rule.contains("no-misused-promises")
            || rule.contains("no-explicit-any")
            || rule.contains("no-unsafe")
        {
            FindingCategory::TypeSafety
        } else if rule.contains("indent")
            || rule.contains("quotes")
            || rule.contains("semi")
            || rule.contains("comma")
            || rule.contains("max-len")
        {
            FindingCategory::Formatting
        } else {
            FindingCategory::Other
        }
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingCategory::UnusedImport => write!(f, "unused-import"),
            FindingCategory::UnusedVariable => write!(f, "unused-variable"),
            FindingCategory::Formatting => write!(f, "formatting"),
            FindingCategory::TypeSafety => write!(f, "type-safety"),
            FindingCategory::Other => write!(f, "other"),
        }
    }
}

/// One reported static-analysis issue tied to a file location.
///
/// Immutable once collected.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_path: PathBuf,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub message: String,
    /// The identifier the finding is about (e.g. the unused variable name)
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub category: FindingCategory,
}

/// Domain a finding's subject belongs to, per the preservation vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Astrological,
    Campaign,
    Culinary,
    Test,
    Service,
    #[default]
    Generic,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Astrological => write!(f, "astrological"),
            Domain::Campaign => write!(f, "campaign"),
            Domain::Culinary => write!(f, "culinary"),
            Domain::Test => write!(f, "test"),
            Domain::Service => write!(f, "service"),
            Domain::Generic => write!(f, "generic"),
        }
    }
}

/// The preserve/eliminate/review decision for one finding.
///
/// A pure function of (subject_name, file_path, file_content); never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub finding_id: String,
    pub should_preserve: bool,
    pub domain: Domain,
    /// Certainty of the decision, 0.0 to 1.0
    pub confidence: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    /// Ambiguous findings are excluded from automated batches
    #[serde(default)]
    pub review_required: bool,
}

impl ClassificationResult {
    /// Whether the planner may put this finding into a batch.
    pub fn eligible_for_batch(&self) -> bool {
        !self.should_preserve && !self.review_required
    }
}

/// A bounded set of eliminate-eligible findings processed as one
/// atomic transaction. Consumed exactly once by the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub findings: Vec<Finding>,
    /// Hard cap the planner enforced when building this batch
    pub max_total: usize,
    /// Sub-cap for critical-risk findings
    pub max_critical: usize,
}

impl Batch {
    /// Distinct files touched by this batch, in first-seen order.
    pub fn touched_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for finding in &self.findings {
            if !files.contains(&finding.file_path) {
                files.push(finding.file_path.clone());
            }
        }
        files
    }
}

/// Pre-mutation copy of one file, owned by the executor for the lifetime
/// of one batch. Deleted after commit, retained after rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub file_path: PathBuf,
    pub original_content: String,
    pub timestamp_id: String,
}

/// Validation gates a batch must pass before commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gate {
    CompileCheck,
    SyntaxIntegrity,
    CriticalPatternDiff,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::CompileCheck => write!(f, "compile-check"),
            Gate::SyntaxIntegrity => write!(f, "syntax-integrity"),
            Gate::CriticalPatternDiff => write!(f, "critical-pattern-diff"),
        }
    }
}

/// Outcome of one gate for one batch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub gate: Gate,
    pub passed: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Terminal state of one executed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Committed,
    RolledBack,
    ManualInterventionRequired,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Committed => write!(f, "committed"),
            Outcome::RolledBack => write!(f, "rolled-back"),
            Outcome::ManualInterventionRequired => write!(f, "manual-intervention-required"),
        }
    }
}

/// Append-only audit record for one batch execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub batch_id: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub validation_reports: Vec<ValidationReport>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Invariant check: a committed batch implies every gate passed.
    pub fn is_consistent(&self) -> bool {
        self.outcome != Outcome::Committed || self.validation_reports.iter().all(|r| r.passed)
    }
}

/// One time-series entry in the metrics history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub unused_count: usize,
}

/// Severity of a ledger alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Green => write!(f, "green"),
            AlertLevel::Yellow => write!(f, "yellow"),
            AlertLevel::Orange => write!(f, "orange"),
            AlertLevel::Red => write!(f, "red"),
        }
    }
}

/// Direction of the finding count over recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// A threshold-based notification raised by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertLevel,
    pub metric: String,
    pub current_value: usize,
    pub threshold: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_id_deterministic() {
        let a = deterministic_finding_id("no-unused-vars", "src/a.ts", 10, "tempCounter");
        let b = deterministic_finding_id("no-unused-vars", "src/a.ts", 10, "tempCounter");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let c = deterministic_finding_id("no-unused-vars", "src/a.ts", 11, "tempCounter");
        assert_ne!(a, c);
    }

    #[test]
    fn test_category_from_rule_id() {
        assert_eq!(
            FindingCategory::from_rule_id("@typescript-eslint/no-unused-vars"),
            FindingCategory::UnusedVariable
        );
        assert_eq!(
            FindingCategory::from_rule_id("unused-imports/no-unused-imports"),
            FindingCategory::UnusedImport
        );
        assert_eq!(
            FindingCategory::from_rule_id("@typescript-eslint/no-floating-promises"),
            FindingCategory::TypeSafety
        );
        assert_eq!(
            FindingCategory::from_rule_id("indent"),
            FindingCategory::Formatting
        );
        assert_eq!(
            FindingCategory::from_rule_id("eqeqeq"),
            FindingCategory::Other
        );
    }

    #[test]
    fn test_committed_record_consistency() {
        let record = ExecutionRecord {
            batch_id: "b1".into(),
            outcome: Outcome::Committed,
            duration_ms: 12,
            validation_reports: vec![ValidationReport {
                gate: Gate::CompileCheck,
                passed: false,
                issues: vec!["TS2304".into()],
            }],
            timestamp: Utc::now(),
        };
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_batch_touched_files_dedup() {
        let batch = Batch {
            id: "b".into(),
            findings: vec![
                Finding {
                    file_path: "src/a.ts".into(),
                    ..Default::default()
                },
                Finding {
                    file_path: "src/b.ts".into(),
                    ..Default::default()
                },
                Finding {
                    file_path: "src/a.ts".into(),
                    ..Default::default()
                },
            ],
            max_total: 15,
            max_critical: 8,
        };
        assert_eq!(batch.touched_files().len(), 2);
    }
}
