//! Rate Limiter / Cooldown Guard
//!
//! Process-wide gate bounding how often transformation runs may execute.
//! State is a JSON list of execution timestamps shared by all invocations;
//! single-writer, last-writer-wins. On any read/parse failure the guard
//! fails open: availability wins over strict enforcement for this
//! non-critical check, but the failure is logged.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::state;

/// Persisted rate-limit record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitState {
    pub execution_timestamps: Vec<DateTime<Utc>>,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
}

impl Decision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: "within limits".into(),
        }
    }

    fn refused(reason: String) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Sliding-window execution guard
pub struct RateLimiter {
    path: PathBuf,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(repo_path: &Path, config: RateLimitConfig) -> Self {
        Self {
            path: state::rate_limit_path(repo_path),
            config,
        }
    }

    /// Check whether another execution is currently allowed.
    pub fn check_allowed(&self) -> Decision {
        self.check_allowed_at(Utc::now())
    }

    fn check_allowed_at(&self, now: DateTime<Utc>) -> Decision {
        let state = self.load_state();

        let window_start = now - Duration::minutes(60);
        let recent: Vec<&DateTime<Utc>> = state
            .execution_timestamps
            .iter()
            .filter(|t| **t > window_start)
            .collect();

        if recent.len() >= self.config.max_per_hour {
            return Decision::refused(format!(
                "hourly ceiling reached: {} executions in the last 60 minutes (max {})",
                recent.len(),
                self.config.max_per_hour
            ));
        }

        if let Some(last) = recent.iter().map(|t| **t).max() {
            let since_last = now.signed_duration_since(last);
            let cooldown = Duration::seconds(self.config.cooldown_secs as i64);
            if since_last < cooldown {
                return Decision::refused(format!(
                    "cooldown active: last execution {}s ago (cooldown {}s)",
                    since_last.num_seconds(),
                    self.config.cooldown_secs
                ));
            }
        }

        Decision::allowed()
    }

    /// Record one execution. Entries older than the trailing window are
    /// trimmed on every write.
    pub fn record_execution(&self) -> Result<()> {
        self.record_execution_at(Utc::now())
    }

    fn record_execution_at(&self, now: DateTime<Utc>) -> Result<()> {
        let mut state = self.load_state();
        state.execution_timestamps.push(now);

        let window_start = now - Duration::minutes(60);
        state.execution_timestamps.retain(|t| *t > window_start);
        state.execution_timestamps.sort();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Load persisted state; an unreadable or corrupt file fails open.
    fn load_state(&self) -> RateLimitState {
        if !self.path.exists() {
            return RateLimitState::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => state,
                Err(e) => {
                    warn!(
                        "Rate-limit state at {} is corrupt ({}); failing open",
                        self.path.display(),
                        e
                    );
                    RateLimitState::default()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read rate-limit state at {} ({}); failing open",
                    self.path.display(),
                    e
                );
                RateLimitState::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn limiter(dir: &Path, max_per_hour: usize, cooldown_secs: u64) -> RateLimiter {
        RateLimiter::new(
            dir,
            RateLimitConfig {
                max_per_hour,
                cooldown_secs,
            },
        )
    }

    #[test]
    fn test_fresh_state_allows() {
        let dir = tempdir().expect("tempdir");
        let guard = limiter(dir.path(), 20, 5);
        assert!(guard.check_allowed().allowed);
    }

    #[test]
    fn test_cooldown_refuses_then_allows() {
        let dir = tempdir().expect("tempdir");
        let guard = limiter(dir.path(), 20, 5);

        let t0 = Utc::now();
        guard.record_execution_at(t0).expect("record");

        let refused = guard.check_allowed_at(t0 + Duration::seconds(2));
        assert!(!refused.allowed);
        assert!(refused.reason.contains("cooldown"));

        let allowed = guard.check_allowed_at(t0 + Duration::seconds(6));
        assert!(allowed.allowed);
    }

    #[test]
    fn test_hourly_ceiling() {
        let dir = tempdir().expect("tempdir");
        let guard = limiter(dir.path(), 3, 0);

        let t0 = Utc::now();
        for i in 0..3 {
            guard
                .record_execution_at(t0 + Duration::minutes(i))
                .expect("record");
        }

        let refused = guard.check_allowed_at(t0 + Duration::minutes(10));
        assert!(!refused.allowed);
        assert!(refused.reason.contains("ceiling"));

        // Entries age out of the trailing 60-minute window
        let allowed = guard.check_allowed_at(t0 + Duration::minutes(90));
        assert!(allowed.allowed);
    }

    #[test]
    fn test_trim_on_write() {
        let dir = tempdir().expect("tempdir");
        let guard = limiter(dir.path(), 20, 0);

        let t0 = Utc::now();
        guard.record_execution_at(t0).expect("record");
        guard
            .record_execution_at(t0 + Duration::minutes(120))
            .expect("record");

        let state = guard.load_state();
        // The first entry fell out of the window on the second write
        assert_eq!(state.execution_timestamps.len(), 1);
    }

    #[test]
    fn test_corrupt_state_fails_open() {
        let dir = tempdir().expect("tempdir");
        let guard = limiter(dir.path(), 1, 5);

        state::ensure_state_dir(dir.path()).expect("state dir");
        std::fs::write(state::rate_limit_path(dir.path()), "{ not json").expect("write");

        assert!(guard.check_allowed().allowed);
    }
}
