//! Transaction Executor
//!
//! Runs one batch through the state machine
//! `Pending -> Snapshotted -> Applied -> Validating -> {Committed |
//! RolledBack | ManualInterventionRequired}`.
//!
//! Ordering guarantees: every touched file is snapshotted before any file
//! is mutated, and validation runs only after every file has been mutated.
//! Side effects are strictly scoped to the files named in the batch.
//! Snapshots are persisted to disk before the first write, so an interrupt
//! between apply and commit leaves the restoration material intact for the
//! next run.

pub mod edits;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{
    Batch, ExecutionRecord, Finding, Gate, Outcome, Snapshot, ValidationReport,
};
use crate::state;
use crate::tools::TypeChecker;

/// States of one batch transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Pending,
    Snapshotted,
    Applied,
    Validating,
    Committed,
    RolledBack,
    ManualInterventionRequired,
}

/// Errors that abort a batch before any file is mutated.
///
/// Everything after the snapshot phase resolves into an
/// [`ExecutionRecord`] instead: by then there is state to account for.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("failed to snapshot {file}: {source}")]
    SnapshotFailed {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to persist snapshot for {file}: {source}")]
    SnapshotWriteFailed {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write in-flight marker for batch {batch_id}: {detail}")]
    MarkerWriteFailed { batch_id: String, detail: String },
}

/// On-disk record of a batch that has started mutating files but has not
/// reached a terminal state. Present only between apply and
/// commit/rollback; a marker found at startup means the previous run was
/// interrupted and its files must be restored before anything else runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InFlightMarker {
    pub batch_id: String,
    pub timestamp_id: String,
    pub files: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
}

/// Detect and resolve an interrupted transaction.
///
/// An interrupt between apply and commit is resolved as a validation
/// failure: every file named in the marker is restored byte-for-byte from
/// the batch's persisted snapshots, then the marker is removed. A restore
/// failure escalates to the halt marker, same as a failed rollback.
pub fn resume_interrupted(repo_path: &Path) -> anyhow::Result<Option<InFlightMarker>> {
    let marker_path = state::in_flight_path(repo_path);
    if !marker_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&marker_path)?;
    let marker: InFlightMarker = serde_json::from_str(&content)?;
    warn!(
        "Batch {} was interrupted mid-transaction; restoring {} file(s)",
        marker.batch_id,
        marker.files.len()
    );

    let backup_root = state::backup_dir(repo_path, &marker.timestamp_id);
    let mut failed = Vec::new();
    for file in &marker.files {
        match std::fs::read(backup_root.join(file)) {
            Ok(original) => {
                if let Err(e) = std::fs::write(repo_path.join(file), original) {
                    failed.push(format!("{} ({})", file.display(), e));
                }
            }
            Err(e) => failed.push(format!("{} (snapshot unreadable: {})", file.display(), e)),
        }
    }

    if !failed.is_empty() {
        let detail = format!(
            "batch {}: interrupted-run restore failed for: {}\nsnapshots retained in {}\n",
            marker.batch_id,
            failed.join(", "),
            backup_root.display()
        );
        error!("{}", detail.trim_end());
        state::set_halted(repo_path, &detail)?;
        anyhow::bail!("could not restore interrupted batch {}", marker.batch_id);
    }

    std::fs::remove_file(&marker_path)?;
    Ok(Some(marker))
}

/// Executes batches one at a time. Strictly sequential; never runs two
/// batches concurrently.
pub struct Executor<'a> {
    repo_path: &'a Path,
    type_checker: &'a dyn TypeChecker,
    protected_identifiers: &'a [String],
}

impl<'a> Executor<'a> {
    pub fn new(
        repo_path: &'a Path,
        type_checker: &'a dyn TypeChecker,
        protected_identifiers: &'a [String],
    ) -> Self {
        Self {
            repo_path,
            type_checker,
            protected_identifiers,
        }
    }

    /// Execute one batch to a terminal state.
    ///
    /// Returns `Err` only when snapshotting fails, in which case no file
    /// has been touched.
    pub fn execute(&self, batch: &Batch) -> Result<ExecutionRecord, ExecutorError> {
        let start = Instant::now();
        let timestamp_id = format!(
            "{}-{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            &batch.id[..8.min(batch.id.len())]
        );

        let mut exec_state = ExecState::Pending;
        debug!("Batch {}: {:?}", batch.id, exec_state);

        // Pending -> Snapshotted: all-or-nothing entry
        let snapshots = self.snapshot_all(batch, &timestamp_id)?;
        exec_state = ExecState::Snapshotted;
        debug!("Batch {}: {:?}", batch.id, exec_state);

        // The marker goes down before the first write so an interrupt
        // anywhere between apply and commit is detectable on the next run.
        self.write_in_flight_marker(batch, &timestamp_id)?;

        // Snapshotted -> Applied: mutate in place, file by file
        let apply_error = self.apply_all(batch, &snapshots);
        exec_state = ExecState::Applied;
        debug!("Batch {}: {:?}", batch.id, exec_state);

        // Applied -> Validating: every gate runs, in sequence
        exec_state = ExecState::Validating;
        debug!("Batch {}: {:?}", batch.id, exec_state);
        let mut reports = self.run_gates(&snapshots);
        if let Err(e) = apply_error {
            // A failed apply is resolved through the validation-failure
            // path so the rollback machinery is the single exit.
            reports.insert(
                0,
                ValidationReport {
                    gate: Gate::SyntaxIntegrity,
                    passed: false,
                    issues: vec![format!("apply failed: {e}")],
                },
            );
        }

        let all_passed = reports.iter().all(|r| r.passed);
        let outcome = if all_passed {
            self.commit(batch, &timestamp_id);
            exec_state = ExecState::Committed;
            Outcome::Committed
        } else {
            match self.rollback(&snapshots) {
                Ok(()) => {
                    exec_state = ExecState::RolledBack;
                    Outcome::RolledBack
                }
                Err(failed_files) => {
                    exec_state = ExecState::ManualInterventionRequired;
                    let detail = format!(
                        "batch {}: rollback failed for: {}\nsnapshots retained in {}\n",
                        batch.id,
                        failed_files.join(", "),
                        state::backup_dir(self.repo_path, &timestamp_id).display()
                    );
                    error!("{}", detail.trim_end());
                    if let Err(e) = state::set_halted(self.repo_path, &detail) {
                        error!("Could not write halt marker: {}", e);
                    }
                    Outcome::ManualInterventionRequired
                }
            }
        };
        info!("Batch {}: {:?}", batch.id, exec_state);

        // Terminal state reached: the transaction is no longer in flight.
        // After a failed rollback the halt marker takes over.
        if let Err(e) = std::fs::remove_file(state::in_flight_path(self.repo_path)) {
            warn!("Batch {}: could not clear in-flight marker: {}", batch.id, e);
        }

        Ok(ExecutionRecord {
            batch_id: batch.id.clone(),
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
            validation_reports: reports,
            timestamp: Utc::now(),
        })
    }

    /// Record the transaction as in flight. A failure aborts the batch
    /// before any file is mutated: without the marker an interrupt would
    /// be invisible to the next run.
    fn write_in_flight_marker(&self, batch: &Batch, timestamp_id: &str) -> Result<(), ExecutorError> {
        let marker = InFlightMarker {
            batch_id: batch.id.clone(),
            timestamp_id: timestamp_id.to_string(),
            files: batch.touched_files(),
            started_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&marker).map_err(|e| {
            ExecutorError::MarkerWriteFailed {
                batch_id: batch.id.clone(),
                detail: e.to_string(),
            }
        })?;
        state::ensure_state_dir(self.repo_path).map_err(|e| {
            ExecutorError::MarkerWriteFailed {
                batch_id: batch.id.clone(),
                detail: e.to_string(),
            }
        })?;
        std::fs::write(state::in_flight_path(self.repo_path), json).map_err(|e| {
            ExecutorError::MarkerWriteFailed {
                batch_id: batch.id.clone(),
                detail: e.to_string(),
            }
        })
    }

    /// Snapshot every touched file before any mutation. A failure aborts
    /// the whole batch with nothing written.
    fn snapshot_all(
        &self,
        batch: &Batch,
        timestamp_id: &str,
    ) -> Result<Vec<Snapshot>, ExecutorError> {
        let mut snapshots = Vec::new();
        for file in batch.touched_files() {
            let full_path = self.repo_path.join(&file);
            let original_content = std::fs::read_to_string(&full_path).map_err(|source| {
                ExecutorError::SnapshotFailed {
                    file: file.clone(),
                    source,
                }
            })?;
            snapshots.push(Snapshot {
                file_path: file,
                original_content,
                timestamp_id: timestamp_id.to_string(),
            });
        }

        // Persist all snapshots before the first apply
        let backup_root = state::backup_dir(self.repo_path, timestamp_id);
        for snapshot in &snapshots {
            let backup_path = backup_root.join(&snapshot.file_path);
            if let Some(parent) = backup_path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    ExecutorError::SnapshotWriteFailed {
                        file: snapshot.file_path.clone(),
                        source,
                    }
                })?;
            }
            std::fs::write(&backup_path, &snapshot.original_content).map_err(|source| {
                ExecutorError::SnapshotWriteFailed {
                    file: snapshot.file_path.clone(),
                    source,
                }
            })?;
        }
        Ok(snapshots)
    }

    /// Apply the batch's edits file by file. Each file's edits are planned
    /// against its snapshot content and applied in one write.
    fn apply_all(&self, batch: &Batch, snapshots: &[Snapshot]) -> anyhow::Result<()> {
        let by_file: HashMap<&PathBuf, &Snapshot> =
            snapshots.iter().map(|s| (&s.file_path, s)).collect();

        let mut findings_by_file: HashMap<&PathBuf, Vec<&Finding>> = HashMap::new();
        for finding in &batch.findings {
            findings_by_file
                .entry(&finding.file_path)
                .or_default()
                .push(finding);
        }

        for (file, findings) in &findings_by_file {
            let snapshot = by_file
                .get(*file)
                .ok_or_else(|| anyhow::anyhow!("no snapshot for {}", file.display()))?;

            let mut edits = Vec::new();
            let mut seen_lines = Vec::new();
            for finding in findings {
                // One edit per line: a second finding on the same line is
                // left for the next collect/plan cycle.
                if seen_lines.contains(&finding.line) {
                    debug!(
                        "Skipping {} on {}:{}: line already edited in this batch",
                        finding.rule_id,
                        file.display(),
                        finding.line
                    );
                    continue;
                }
                let planned = edits::plan_edits(finding, &snapshot.original_content);
                if !planned.is_empty() {
                    seen_lines.push(finding.line);
                    edits.extend(planned);
                }
            }
            if edits.is_empty() {
                continue;
            }

            let new_content = edits::apply_edits(&snapshot.original_content, &edits)?;
            let full_path = self.repo_path.join(file);
            std::fs::write(&full_path, new_content)?;
        }
        Ok(())
    }

    /// Run all configured gates in sequence, collecting one report each.
    fn run_gates(&self, snapshots: &[Snapshot]) -> Vec<ValidationReport> {
        let mut reports = Vec::new();

        // Gate 1: compile/type check. A timeout counts as a failure.
        let outcome = self.type_checker.run_type_check();
        reports.push(ValidationReport {
            gate: Gate::CompileCheck,
            passed: outcome.passed,
            issues: outcome.diagnostics,
        });

        // Gate 2: syntax integrity of every touched file
        let mut syntax_issues = Vec::new();
        for snapshot in snapshots {
            let full_path = self.repo_path.join(&snapshot.file_path);
            match std::fs::read_to_string(&full_path) {
                Ok(content) => {
                    for issue in check_syntax_integrity(&content) {
                        syntax_issues.push(format!("{}: {}", snapshot.file_path.display(), issue));
                    }
                }
                Err(e) => {
                    syntax_issues.push(format!("{}: unreadable: {}", snapshot.file_path.display(), e))
                }
            }
        }
        reports.push(ValidationReport {
            gate: Gate::SyntaxIntegrity,
            passed: syntax_issues.is_empty(),
            issues: syntax_issues,
        });

        // Gate 3: critical-pattern diff. Any change in the occurrence
        // count of a protected identifier fails the batch.
        let mut pattern_issues = Vec::new();
        for snapshot in snapshots {
            let full_path = self.repo_path.join(&snapshot.file_path);
            let after = std::fs::read_to_string(&full_path).unwrap_or_default();
            for identifier in self.protected_identifiers {
                let before_count = count_occurrences(&snapshot.original_content, identifier);
                let after_count = count_occurrences(&after, identifier);
                if before_count != after_count {
                    pattern_issues.push(format!(
                        "{}: '{}' count changed {} -> {}",
                        snapshot.file_path.display(),
                        identifier,
                        before_count,
                        after_count
                    ));
                }
            }
        }
        reports.push(ValidationReport {
            gate: Gate::CriticalPatternDiff,
            passed: pattern_issues.is_empty(),
            issues: pattern_issues,
        });

        reports
    }

    /// Discard snapshots after a successful commit.
    fn commit(&self, batch: &Batch, timestamp_id: &str) {
        let backup_root = state::backup_dir(self.repo_path, timestamp_id);
        if let Err(e) = std::fs::remove_dir_all(&backup_root) {
            // Not fatal: a stale backup dir is clutter, not corruption
            warn!(
                "Batch {} committed but backup cleanup failed: {}",
                batch.id, e
            );
        }
    }

    /// Restore every touched file byte-for-byte from its snapshot.
    /// Snapshots are retained on disk for manual inspection.
    fn rollback(&self, snapshots: &[Snapshot]) -> Result<(), Vec<String>> {
        let mut failed = Vec::new();
        for snapshot in snapshots {
            let full_path = self.repo_path.join(&snapshot.file_path);
            if let Err(e) = std::fs::write(&full_path, &snapshot.original_content) {
                failed.push(format!("{} ({})", snapshot.file_path.display(), e));
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(failed)
        }
    }
}

fn duplicated_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r",\s*,|;;|\bawait\s+await\b|\bvoid\s+void\b|\bconst\s+const\b|\breturn\s+return\b")
            .expect("valid regex")
    })
}

/// Detect obviously corrupted output: unbalanced delimiters and
/// duplicated-token artifacts left behind by a bad rewrite.
pub fn check_syntax_integrity(content: &str) -> Vec<String> {
    let mut issues = Vec::new();

    for (open, close, name) in [('(', ')', "parentheses"), ('{', '}', "braces"), ('[', ']', "brackets")] {
        let opens = content.chars().filter(|c| *c == open).count();
        let closes = content.chars().filter(|c| *c == close).count();
        if opens != closes {
            issues.push(format!("unbalanced {}: {} open vs {} close", name, opens, closes));
        }
    }

    for (i, line) in content.lines().enumerate() {
        if duplicated_token_regex().is_match(line) {
            issues.push(format!("duplicated token artifact on line {}", i + 1));
        }
    }

    issues
}

fn count_occurrences(content: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    content.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{deterministic_finding_id, FindingCategory};
    use crate::tools::TypeCheckOutcome;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct MockTypeChecker {
        pass: Cell<bool>,
    }

    impl MockTypeChecker {
        fn passing() -> Self {
            Self { pass: Cell::new(true) }
        }

        fn failing() -> Self {
            Self { pass: Cell::new(false) }
        }
    }

    impl TypeChecker for MockTypeChecker {
        fn run_type_check(&self) -> TypeCheckOutcome {
            TypeCheckOutcome {
                passed: self.pass.get(),
                diagnostics: if self.pass.get() {
                    Vec::new()
                } else {
                    vec!["TS2304: Cannot find name 'x'".into()]
                },
                timed_out: false,
            }
        }
    }

    fn make_batch(findings: Vec<Finding>) -> Batch {
        Batch {
            id: "test-batch-0001".into(),
            findings,
            max_total: 15,
            max_critical: 8,
        }
    }

    fn unused_var_finding(file: &str, line: u32, subject: &str) -> Finding {
        Finding {
            id: deterministic_finding_id("no-unused-vars", file, line, subject),
            file_path: PathBuf::from(file),
            line,
            column: 1,
            rule_id: "no-unused-vars".into(),
            message: format!("'{}' is assigned a value but never used.", subject),
            subject_name: subject.into(),
            category: FindingCategory::UnusedVariable,
        }
    }

    #[test]
    fn test_commit_on_all_gates_passing() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("src/util.ts");
        std::fs::create_dir_all(file.parent().unwrap()).expect("mkdir");
        std::fs::write(&file, "const keep = 1;\nconst tempCounter = 2;\nuse(keep);\n")
            .expect("write");

        let checker = MockTypeChecker::passing();
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![unused_var_finding("src/util.ts", 2, "tempCounter")]);

        let record = executor.execute(&batch).expect("execute");
        assert_eq!(record.outcome, Outcome::Committed);
        assert!(record.is_consistent());

        let content = std::fs::read_to_string(&file).expect("read");
        assert!(!content.contains("tempCounter"));
    }

    #[test]
    fn test_rollback_restores_bytes_exactly() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("src/util.ts");
        std::fs::create_dir_all(file.parent().unwrap()).expect("mkdir");
        let original = "const keep = 1;\nconst tempCounter = 2;\nuse(keep);\n";
        std::fs::write(&file, original).expect("write");

        let checker = MockTypeChecker::failing();
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![unused_var_finding("src/util.ts", 2, "tempCounter")]);

        let record = executor.execute(&batch).expect("execute");
        assert_eq!(record.outcome, Outcome::RolledBack);

        let content = std::fs::read_to_string(&file).expect("read");
        assert_eq!(content, original);

        // Snapshot retained for inspection
        let backups = dir.path().join(".lintsweep/backups");
        assert!(backups.exists());
    }

    #[test]
    fn test_snapshot_failure_aborts_before_mutation() {
        let dir = tempdir().expect("tempdir");
        let present = dir.path().join("src/present.ts");
        std::fs::create_dir_all(present.parent().unwrap()).expect("mkdir");
        let original = "const tempValue = 1;\n";
        std::fs::write(&present, original).expect("write");

        let checker = MockTypeChecker::passing();
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![
            unused_var_finding("src/present.ts", 1, "tempValue"),
            unused_var_finding("src/missing.ts", 1, "ghost"),
        ]);

        let result = executor.execute(&batch);
        assert!(matches!(result, Err(ExecutorError::SnapshotFailed { .. })));

        // The file that does exist was never touched
        let content = std::fs::read_to_string(&present).expect("read");
        assert_eq!(content, original);
    }

    #[test]
    fn test_protected_identifier_change_fails_gate() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("src/positions.ts");
        std::fs::create_dir_all(file.parent().unwrap()).expect("mkdir");
        // The unused declaration mentions the protected identifier, so
        // deleting the line changes its occurrence count.
        let original = "const cache = planetaryPosition;\nexport { planetaryPosition };\n";
        std::fs::write(&file, original).expect("write");

        let checker = MockTypeChecker::passing();
        let protected = vec!["planetaryPosition".to_string()];
        let executor = Executor::new(dir.path(), &checker, &protected);
        let batch = make_batch(vec![unused_var_finding("src/positions.ts", 1, "cache")]);

        let record = executor.execute(&batch).expect("execute");
        assert_eq!(record.outcome, Outcome::RolledBack);
        let diff_report = record
            .validation_reports
            .iter()
            .find(|r| r.gate == Gate::CriticalPatternDiff)
            .expect("diff gate ran");
        assert!(!diff_report.passed);

        assert_eq!(std::fs::read_to_string(&file).expect("read"), original);
    }

    #[test]
    fn test_syntax_integrity_checks() {
        assert!(check_syntax_integrity("fn ok() { (1 + 2) }").is_empty());
        assert!(!check_syntax_integrity("fn bad() { (1 + 2 }").is_empty());
        assert!(!check_syntax_integrity("a,, b").is_empty());
        assert!(!check_syntax_integrity("return return x;").is_empty());
        assert!(!check_syntax_integrity("await await p;").is_empty());
    }

    #[test]
    fn test_in_flight_marker_cleared_on_terminal_state() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "const tempX = 1;\n").expect("write");

        let checker = MockTypeChecker::passing();
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![unused_var_finding("a.ts", 1, "tempX")]);

        let record = executor.execute(&batch).expect("execute");
        assert_eq!(record.outcome, Outcome::Committed);
        assert!(!state::in_flight_path(dir.path()).exists());
        assert!(resume_interrupted(dir.path()).expect("resume").is_none());
    }

    /// A type checker that dies mid-validation, leaving the batch between
    /// apply and its terminal state.
    struct CrashingTypeChecker;

    impl TypeChecker for CrashingTypeChecker {
        fn run_type_check(&self) -> TypeCheckOutcome {
            panic!("type checker process lost");
        }
    }

    #[test]
    fn test_interrupt_during_validation_is_recovered_on_resume() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("src/util.ts");
        std::fs::create_dir_all(file.parent().unwrap()).expect("mkdir");
        let original = "const keep = 1;\nconst tempCounter = 2;\nuse(keep);\n";
        std::fs::write(&file, original).expect("write");

        let checker = CrashingTypeChecker;
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![unused_var_finding("src/util.ts", 2, "tempCounter")]);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            executor.execute(&batch)
        }));
        assert!(result.is_err());

        // The interrupt left the file mutated with the marker still down
        let mutated = std::fs::read_to_string(&file).expect("read");
        assert!(!mutated.contains("tempCounter"));
        assert!(state::in_flight_path(dir.path()).exists());

        // Resume restores the original bytes and lifts the marker
        let marker = resume_interrupted(dir.path())
            .expect("resume")
            .expect("marker found");
        assert_eq!(marker.batch_id, batch.id);
        assert_eq!(std::fs::read_to_string(&file).expect("read"), original);
        assert!(!state::in_flight_path(dir.path()).exists());
    }

    #[test]
    fn test_resume_halts_when_snapshots_are_gone() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "mutated content\n").expect("write");

        let marker = InFlightMarker {
            batch_id: "orphan-batch".into(),
            timestamp_id: "20260823-000000-orphanba".into(),
            files: vec![PathBuf::from("a.ts")],
            started_at: Utc::now(),
        };
        state::ensure_state_dir(dir.path()).expect("state dir");
        std::fs::write(
            state::in_flight_path(dir.path()),
            serde_json::to_string(&marker).expect("serialize"),
        )
        .expect("write marker");

        let result = resume_interrupted(dir.path());
        assert!(result.is_err());
        assert!(state::is_halted(dir.path()));
    }

    #[test]
    fn test_committed_record_has_all_gates_passed() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "const tempX = 1;\n").expect("write");

        let checker = MockTypeChecker::passing();
        let executor = Executor::new(dir.path(), &checker, &[]);
        let batch = make_batch(vec![unused_var_finding("a.ts", 1, "tempX")]);

        let record = executor.execute(&batch).expect("execute");
        assert_eq!(record.outcome, Outcome::Committed);
        assert_eq!(record.validation_reports.len(), 3);
        assert!(record.validation_reports.iter().all(|r| r.passed));
    }
}
