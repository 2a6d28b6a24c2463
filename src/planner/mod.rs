//! Batch Planner
//!
//! Groups eliminate-eligible findings into size-capped, category-capped
//! batches. Findings for one file never straddle two batches, so no batch
//! can interfere with another's snapshot of the same file. Planning never
//! touches disk; batches are handed to the executor exactly once.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::models::{Batch, ClassificationResult, Finding, FindingCategory};

/// Whether a finding counts against the stricter per-batch sub-cap.
///
/// Type-safety rewrites and anything living in service/API code carry more
/// risk than unused bindings in generic or test code.
pub fn is_critical(finding: &Finding) -> bool {
    if finding.category == FindingCategory::TypeSafety {
        return true;
    }
    let path = finding.file_path.to_string_lossy().to_lowercase();
    ["/services/", "/api/", "/server/", "/backend/"]
        .iter()
        .any(|dir| path.contains(dir))
}

/// Plan batches from classified findings.
///
/// Only findings classified eliminate (not preserved, not review-required)
/// are considered. A single file with more eligible findings than the hard
/// cap is truncated to the cap; the remainder is picked up by a later run.
pub fn plan(
    findings: &[Finding],
    classifications: &HashMap<String, ClassificationResult>,
    limits: &BatchConfig,
) -> Vec<Batch> {
    let max_total = limits.max_total.max(1);
    let max_critical = limits.max_critical.min(max_total);

    // Group eligible findings by file, keeping first-seen order
    let mut file_order: Vec<PathBuf> = Vec::new();
    let mut by_file: HashMap<PathBuf, Vec<Finding>> = HashMap::new();
    let mut deferred = 0usize;

    for finding in findings {
        let eligible = classifications
            .get(&finding.id)
            .is_some_and(ClassificationResult::eligible_for_batch);
        if !eligible {
            continue;
        }
        if !by_file.contains_key(&finding.file_path) {
            file_order.push(finding.file_path.clone());
        }
        by_file
            .entry(finding.file_path.clone())
            .or_default()
            .push(finding.clone());
    }

    let mut batches: Vec<Batch> = Vec::new();
    let mut current: Vec<Finding> = Vec::new();
    let mut current_critical = 0usize;

    let mut flush = |current: &mut Vec<Finding>, current_critical: &mut usize| {
        if !current.is_empty() {
            batches.push(Batch {
                id: Uuid::new_v4().to_string(),
                findings: std::mem::take(current),
                max_total,
                max_critical,
            });
            *current_critical = 0;
        }
    };

    for file in &file_order {
        let group = &by_file[file];

        // Truncate the group so it can fit in an empty batch on its own
        let mut taken: Vec<Finding> = Vec::new();
        let mut taken_critical = 0usize;
        for finding in group {
            if taken.len() == max_total {
                deferred += 1;
                continue;
            }
            if is_critical(finding) {
                if taken_critical == max_critical {
                    deferred += 1;
                    continue;
                }
                taken_critical += 1;
            }
            taken.push(finding.clone());
        }
        if taken.is_empty() {
            continue;
        }

        // The whole group goes into one batch; start a new one if it
        // does not fit alongside what is already packed.
        let overflows = current.len() + taken.len() > max_total
            || current_critical + taken_critical > max_critical;
        if !current.is_empty() && overflows {
            flush(&mut current, &mut current_critical);
        }
        current_critical += taken_critical;
        current.extend(taken);
    }
    flush(&mut current, &mut current_critical);

    if deferred > 0 {
        debug!(
            "{} findings deferred to a later run by batch caps",
            deferred
        );
    }
    batches
}
