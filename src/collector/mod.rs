//! Diagnostic Collector
//!
//! Invokes the external analyzer and normalizes its structured output into
//! canonical [`Finding`] records. Collection is read-only: no rollback
//! concern, and the rest of the pipeline tolerates zero findings.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::config::CollectorConfig;
use crate::models::{deterministic_finding_id, Finding, FindingCategory};
use crate::tools::Analyzer;

/// Matches the identifier an analyzer message is about, e.g.
/// `'tempCounter' is assigned a value but never used.`
///
/// Only straight single quotes count: ESLint names the offending binding
/// that way, while backticks quote keywords and syntax fragments
/// ("Unexpected `await` of a non-Promise value.") that must not become
/// subjects.
fn subject_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'([A-Za-z_$][A-Za-z0-9_$]*)'").expect("valid regex"))
}

/// Collect findings for `scope`.
///
/// Malformed or missing analyzer output yields an empty list and a logged,
/// non-fatal warning.
pub fn collect(
    analyzer: &dyn Analyzer,
    repo_path: &Path,
    scope: &Path,
    config: &CollectorConfig,
) -> Vec<Finding> {
    let raw = match analyzer.run_analysis(scope) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Analyzer produced no usable output: {}", e);
            return Vec::new();
        }
    };

    parse_report(&raw, repo_path, config)
}

/// Parse an ESLint-style JSON report into findings.
///
/// Expected shape: an array of file entries, each with a `filePath` and a
/// `messages` array of `{ruleId, line, column, message}` objects. Entries
/// missing required fields are skipped individually.
pub fn parse_report(raw: &str, repo_path: &Path, config: &CollectorConfig) -> Vec<Finding> {
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Analyzer output is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let Some(file_entries) = parsed.as_array() else {
        warn!("Analyzer output is not a JSON array; ignoring");
        return Vec::new();
    };

    let mut findings = Vec::new();
    for entry in file_entries {
        let Some(file_path) = entry.get("filePath").and_then(|f| f.as_str()) else {
            continue;
        };
        let rel_path = relative_path(file_path, repo_path);

        let messages = entry
            .get("messages")
            .and_then(|m| m.as_array())
            .cloned()
            .unwrap_or_default();

        for message in &messages {
            let Some(finding) = parse_message(message, &rel_path) else {
                continue;
            };
            if !config.rules.is_empty() && !config.rules.contains(&finding.rule_id) {
                continue;
            }
            findings.push(finding);
        }
    }

    debug!("Collected {} findings", findings.len());
    findings
}

fn parse_message(message: &serde_json::Value, rel_path: &Path) -> Option<Finding> {
    let rule_id = message.get("ruleId")?.as_str()?.to_string();
    let text = message.get("message")?.as_str()?.to_string();
    let line = message.get("line")?.as_u64()? as u32;
    let column = message.get("column").and_then(|c| c.as_u64()).unwrap_or(0) as u32;

    let subject_name = subject_regex()
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let id = deterministic_finding_id(
        &rule_id,
        &rel_path.to_string_lossy(),
        line,
        &subject_name,
    );

    Some(Finding {
        id,
        file_path: rel_path.to_path_buf(),
        line,
        column,
        category: FindingCategory::from_rule_id(&rule_id),
        rule_id,
        message: text,
        subject_name,
    })
}

/// Convert an absolute analyzer path to a repo-relative one with forward
/// slashes, matching how paths are stored everywhere else.
fn relative_path(file_path: &str, repo_path: &Path) -> PathBuf {
    Path::new(file_path)
        .strip_prefix(repo_path)
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|_| PathBuf::from(file_path.replace('\\', "/")))
}
