//! Persistent state layout - everything lives under `.lintsweep/` in the
//! repository root.
//!
//! Layout:
//! - `rate_limit.json`      list of execution timestamps
//! - `metrics_history.json` capped list of timestamped snapshots
//! - `backups/<ts>/...`     pre-batch file snapshots, mirroring relative paths
//! - `reports/run-<ts>.json` one JSON report per applied batch run
//! - `in_flight.json`       transaction marker, present only while a batch
//!   is between apply and its terminal state
//! - `MANUAL_INTERVENTION`  halt marker written when a rollback fails
//!
//! The rate-limit and metrics files are shared across invocations and are
//! read-modify-write with no external locking: last writer wins. Concurrent
//! invocations are a misuse case, not a supported mode.

use std::path::{Path, PathBuf};

/// Name of the halt marker file
pub const MANUAL_INTERVENTION_MARKER: &str = "MANUAL_INTERVENTION";

/// Get the state directory for a repository.
pub fn state_dir(repo_path: &Path) -> PathBuf {
    repo_path.join(".lintsweep")
}

/// Get the rate-limit state file path.
pub fn rate_limit_path(repo_path: &Path) -> PathBuf {
    state_dir(repo_path).join("rate_limit.json")
}

/// Get the metrics history file path.
pub fn metrics_history_path(repo_path: &Path) -> PathBuf {
    state_dir(repo_path).join("metrics_history.json")
}

/// Get the backup directory for one batch, keyed by its timestamp id.
pub fn backup_dir(repo_path: &Path, timestamp_id: &str) -> PathBuf {
    state_dir(repo_path).join("backups").join(timestamp_id)
}

/// Get the reports directory.
pub fn reports_dir(repo_path: &Path) -> PathBuf {
    state_dir(repo_path).join("reports")
}

/// Get the in-flight transaction marker path.
pub fn in_flight_path(repo_path: &Path) -> PathBuf {
    state_dir(repo_path).join("in_flight.json")
}

/// Get the manual-intervention halt marker path.
pub fn manual_intervention_path(repo_path: &Path) -> PathBuf {
    state_dir(repo_path).join(MANUAL_INTERVENTION_MARKER)
}

/// Ensure the state directory exists.
pub fn ensure_state_dir(repo_path: &Path) -> std::io::Result<PathBuf> {
    let dir = state_dir(repo_path);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Whether automated batches are halted pending operator action.
pub fn is_halted(repo_path: &Path) -> bool {
    manual_intervention_path(repo_path).exists()
}

/// Write the halt marker. `detail` names the batch and files that failed
/// to restore, for the operator.
pub fn set_halted(repo_path: &Path, detail: &str) -> std::io::Result<()> {
    ensure_state_dir(repo_path)?;
    std::fs::write(manual_intervention_path(repo_path), detail)
}

/// Clear the halt marker after the operator has resolved the damage.
pub fn clear_halted(repo_path: &Path) -> std::io::Result<()> {
    let path = manual_intervention_path(repo_path);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
