//! Progress Ledger
//!
//! Records baseline and per-batch finding counts in a capped history file,
//! computes the short-term trend, and raises threshold-based alerts. The
//! ledger is updated strictly after the executor reaches a terminal state,
//! so metrics never reflect an in-flight batch.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::AlertConfig;
use crate::models::{Alert, AlertLevel, ExecutionRecord, MetricsSnapshot, Trend};
use crate::state;

/// Capped time-series of finding counts plus alert policy
pub struct Ledger {
    path: PathBuf,
    config: AlertConfig,
}

impl Ledger {
    pub fn new(repo_path: &Path, config: AlertConfig) -> Self {
        Self {
            path: state::metrics_history_path(repo_path),
            config,
        }
    }

    /// Record the starting count for a cleanup effort.
    pub fn record_baseline(&self, count: usize) -> Result<()> {
        debug!("Recording baseline of {} findings", count);
        self.append(count)
    }

    /// Record the post-batch count once the batch reached a terminal state.
    pub fn record_batch(&self, record: &ExecutionRecord, new_count: usize) -> Result<()> {
        debug!(
            "Recording batch {} ({}) with {} findings remaining",
            record.batch_id, record.outcome, new_count
        );
        self.append(new_count)
    }

    /// Record one monitoring sample.
    pub fn record_sample(&self, count: usize) -> Result<()> {
        self.append(count)
    }

    /// Trend over the last 3 history samples.
    ///
    /// Monotonically non-decreasing with a net increase beyond the noise
    /// threshold is increasing; the symmetric rule gives decreasing;
    /// anything else (including a short history) is stable.
    pub fn compute_trend(&self) -> Trend {
        let history = self.load();
        let counts: Vec<usize> = history.iter().map(|s| s.unused_count).collect();
        compute_trend(&counts, self.config.noise_threshold)
    }

    /// Ordered-threshold lookup against the configured boundaries.
    pub fn evaluate_alert_level(&self, count: usize) -> AlertLevel {
        if count >= self.config.red {
            AlertLevel::Red
        } else if count >= self.config.orange {
            AlertLevel::Orange
        } else if count >= self.config.yellow {
            AlertLevel::Yellow
        } else {
            AlertLevel::Green
        }
    }

    /// Produce an alert only when the level is above green or the trend is
    /// increasing. Quiet otherwise, to avoid notification fatigue.
    pub fn maybe_alert(&self, count: usize) -> Option<Alert> {
        let level = self.evaluate_alert_level(count);
        let trend = self.compute_trend();

        if level == AlertLevel::Green && trend != Trend::Increasing {
            return None;
        }

        let threshold = match level {
            AlertLevel::Red => self.config.red,
            AlertLevel::Orange => self.config.orange,
            AlertLevel::Yellow => self.config.yellow,
            AlertLevel::Green => self.config.yellow,
        };
        let message = if trend == Trend::Increasing {
            format!(
                "unused findings trending up: {} now (level {})",
                count, level
            )
        } else {
            format!(
                "unused findings at {} (boundary {} for level {})",
                count, threshold, level
            )
        };

        Some(Alert {
            severity: level,
            metric: "unused_count".into(),
            current_value: count,
            threshold,
            message,
        })
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Option<MetricsSnapshot> {
        self.load().into_iter().last()
    }

    /// Full retained history, oldest first.
    pub fn history(&self) -> Vec<MetricsSnapshot> {
        self.load()
    }

    fn append(&self, count: usize) -> Result<()> {
        let mut history = self.load();
        history.push(MetricsSnapshot {
            timestamp: Utc::now(),
            unused_count: count,
        });

        // Keep the history bounded
        if history.len() > self.config.history_cap {
            let excess = history.len() - self.config.history_cap;
            history.drain(..excess);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&history)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Load the persisted history; corrupt state degrades to empty with a
    /// warning rather than blocking the pipeline.
    fn load(&self) -> Vec<MetricsSnapshot> {
        if !self.path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(history) => history,
                Err(e) => {
                    warn!(
                        "Metrics history at {} is corrupt ({}); starting fresh",
                        self.path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read metrics history at {} ({}); starting fresh",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Trend over the last 3 samples of `counts`.
pub fn compute_trend(counts: &[usize], noise_threshold: usize) -> Trend {
    if counts.len() < 3 {
        return Trend::Stable;
    }
    let window = &counts[counts.len() - 3..];

    let non_decreasing = window.windows(2).all(|w| w[1] >= w[0]);
    let non_increasing = window.windows(2).all(|w| w[1] <= w[0]);

    if non_decreasing && window[2] - window[0] > noise_threshold {
        Trend::Increasing
    } else if non_increasing && window[0] - window[2] > noise_threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gate, Outcome, ValidationReport};
    use tempfile::tempdir;

    fn ledger_with(dir: &Path) -> Ledger {
        Ledger::new(dir, AlertConfig::default())
    }

    #[test]
    fn test_trend_vectors() {
        assert_eq!(compute_trend(&[10, 20, 35], 2), Trend::Increasing);
        assert_eq!(compute_trend(&[35, 20, 10], 2), Trend::Decreasing);
        assert_eq!(compute_trend(&[20, 21, 19], 2), Trend::Stable);
    }

    #[test]
    fn test_trend_short_history_is_stable() {
        assert_eq!(compute_trend(&[], 2), Trend::Stable);
        assert_eq!(compute_trend(&[10, 50], 2), Trend::Stable);
    }

    #[test]
    fn test_trend_uses_last_three_samples() {
        assert_eq!(compute_trend(&[100, 10, 20, 35], 2), Trend::Increasing);
    }

    #[test]
    fn test_alert_levels_ordered() {
        let dir = tempdir().expect("tempdir");
        let ledger = ledger_with(dir.path());
        assert_eq!(ledger.evaluate_alert_level(0), AlertLevel::Green);
        assert_eq!(ledger.evaluate_alert_level(99), AlertLevel::Green);
        assert_eq!(ledger.evaluate_alert_level(100), AlertLevel::Yellow);
        assert_eq!(ledger.evaluate_alert_level(250), AlertLevel::Orange);
        assert_eq!(ledger.evaluate_alert_level(9000), AlertLevel::Red);
    }

    #[test]
    fn test_no_alert_when_green_and_not_increasing() {
        let dir = tempdir().expect("tempdir");
        let ledger = ledger_with(dir.path());
        ledger.record_baseline(50).expect("baseline");
        assert!(ledger.maybe_alert(50).is_none());
    }

    #[test]
    fn test_alert_when_increasing_even_if_green() {
        let dir = tempdir().expect("tempdir");
        let ledger = ledger_with(dir.path());
        for count in [10, 20, 35] {
            ledger.record_baseline(count).expect("append");
        }
        let alert = ledger.maybe_alert(35).expect("alert raised");
        assert_eq!(alert.severity, AlertLevel::Green);
        assert!(alert.message.contains("trending up"));
    }

    #[test]
    fn test_alert_above_green() {
        let dir = tempdir().expect("tempdir");
        let ledger = ledger_with(dir.path());
        ledger.record_baseline(300).expect("baseline");
        let alert = ledger.maybe_alert(300).expect("alert raised");
        assert_eq!(alert.severity, AlertLevel::Orange);
        assert_eq!(alert.current_value, 300);
    }

    #[test]
    fn test_history_capped() {
        let dir = tempdir().expect("tempdir");
        let ledger = Ledger::new(
            dir.path(),
            AlertConfig {
                history_cap: 5,
                ..AlertConfig::default()
            },
        );
        for count in 0..10 {
            ledger.record_baseline(count).expect("append");
        }
        let history = ledger.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history.last().expect("entry").unused_count, 9);
    }

    #[test]
    fn test_record_batch_appends() {
        let dir = tempdir().expect("tempdir");
        let ledger = ledger_with(dir.path());
        ledger.record_baseline(100).expect("baseline");

        let record = ExecutionRecord {
            batch_id: "b1".into(),
            outcome: Outcome::Committed,
            duration_ms: 10,
            validation_reports: vec![ValidationReport {
                gate: Gate::CompileCheck,
                passed: true,
                issues: vec![],
            }],
            timestamp: Utc::now(),
        };
        ledger.record_batch(&record, 90).expect("record batch");

        assert_eq!(ledger.latest().expect("entry").unused_count, 90);
        assert_eq!(ledger.history().len(), 2);
    }
}
