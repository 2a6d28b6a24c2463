//! Project-level configuration support
//!
//! Loads per-project configuration from a `lintsweep.toml` file in the
//! repository root. Every operational constant (batch caps, rate limits,
//! alert boundaries, protected identifiers) is a configuration input; the
//! defaults below are representative, not canonical.
//!
//! # Configuration Format
//!
//! ```toml
//! # lintsweep.toml
//!
//! [batch]
//! max_total = 15
//! max_critical = 8
//!
//! [rate_limit]
//! max_per_hour = 20
//! cooldown_secs = 5
//!
//! [alerts]
//! yellow = 100
//! orange = 250
//! red = 500
//! noise_threshold = 2
//! history_cap = 288
//!
//! [tools]
//! analyzer = ["npx", "eslint", "--format", "json", "."]
//! type_check = ["npx", "tsc", "--noEmit"]
//! timeout_secs = 60
//!
//! [preserve]
//! extra_patterns = ["chakra"]
//! protected_identifiers = ["planetaryPosition", "elementalProperties"]
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Batch planning limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Hard cap on findings per batch
    pub max_total: usize,
    /// Stricter cap for critical-risk findings per batch
    pub max_critical: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_total: 15,
            max_critical: 8,
        }
    }
}

/// Rate limiter policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum executions within any trailing 60-minute window
    pub max_per_hour: usize,
    /// Minimum seconds between consecutive executions
    pub cooldown_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_hour: 20,
            cooldown_secs: 5,
        }
    }
}

/// Alert thresholds for the progress ledger
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Counts at or above these boundaries map to yellow/orange/red
    pub yellow: usize,
    pub orange: usize,
    pub red: usize,
    /// Net change below this is treated as noise by the trend computation
    pub noise_threshold: usize,
    /// Maximum retained metrics history entries
    pub history_cap: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            yellow: 100,
            orange: 250,
            red: 500,
            noise_threshold: 2,
            history_cap: 288,
        }
    }
}

/// External tool commands
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Analyzer command; must emit ESLint-style JSON on stdout
    pub analyzer: Vec<String>,
    /// Type check command; exit code 0 means passed
    pub type_check: Vec<String>,
    /// Timeout applied to both tools, in seconds
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            analyzer: vec![
                "npx".into(),
                "eslint".into(),
                "--format".into(),
                "json".into(),
                ".".into(),
            ],
            type_check: vec!["npx".into(), "tsc".into(), "--noEmit".into()],
            timeout_secs: 60,
        }
    }
}

/// Preservation tuning
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreserveConfig {
    /// Extra case-insensitive substrings that force preservation
    pub extra_patterns: Vec<String>,
    /// Identifiers whose occurrence count must not change across a batch
    pub protected_identifiers: Vec<String>,
}

/// Collector tuning
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// When non-empty, only findings for these rule ids are collected
    pub rules: Vec<String>,
}

/// Full project configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub batch: BatchConfig,
    pub rate_limit: RateLimitConfig,
    pub alerts: AlertConfig,
    pub tools: ToolsConfig,
    pub preserve: PreserveConfig,
    pub collector: CollectorConfig,
}

impl ProjectConfig {
    pub const FILENAME: &'static str = "lintsweep.toml";

    /// Load config from `lintsweep.toml` in the repo root.
    ///
    /// A missing file yields defaults; a malformed file yields defaults
    /// with a logged warning so a bad config never blocks a dry run.
    pub fn load(repo_path: &Path) -> Self {
        let path = repo_path.join(Self::FILENAME);
        if !path.exists() {
            debug!("No {} found, using defaults", Self::FILENAME);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Example config written by `lintsweep init`.
    pub fn example_toml() -> &'static str {
        r#"# lintsweep.toml - safety-gated batch remediation settings

[batch]
# Hard cap on findings per batch, and the stricter sub-cap applied to
# critical-risk findings (type-safety rules, service/API code).
max_total = 15
max_critical = 8

[rate_limit]
# Ceiling on batch executions within any trailing 60-minute window.
max_per_hour = 20
# Minimum seconds between consecutive executions.
cooldown_secs = 5

[alerts]
# Finding-count boundaries for the yellow/orange/red alert levels.
yellow = 100
orange = 250
red = 500
# Net change across the last 3 samples below this is treated as noise.
noise_threshold = 2
# Metrics history entries retained.
history_cap = 288

[tools]
# Analyzer must emit ESLint-style JSON on stdout.
analyzer = ["npx", "eslint", "--format", "json", "."]
type_check = ["npx", "tsc", "--noEmit"]
timeout_secs = 60

[preserve]
# Extra case-insensitive substrings that force preservation.
extra_patterns = []
# Identifiers whose occurrence count must not change across a batch.
protected_identifiers = []

[collector]
# When non-empty, only findings for these rule ids are collected.
rules = []
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.batch.max_total, 15);
        assert_eq!(config.batch.max_critical, 8);
        assert_eq!(config.rate_limit.max_per_hour, 20);
        assert_eq!(config.rate_limit.cooldown_secs, 5);
        assert_eq!(config.alerts.history_cap, 288);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [batch]
            max_total = 5
            "#,
        )
        .expect("parse partial config");
        assert_eq!(config.batch.max_total, 5);
        // Unset fields fall back to defaults
        assert_eq!(config.batch.max_critical, 8);
        assert_eq!(config.rate_limit.max_per_hour, 20);
    }

    #[test]
    fn test_example_toml_parses() {
        let config: ProjectConfig =
            toml::from_str(ProjectConfig::example_toml()).expect("example config parses");
        assert_eq!(config.batch.max_total, 15);
        assert_eq!(config.tools.type_check[1], "tsc");
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let config = ProjectConfig::load(Path::new("/nonexistent/path"));
        assert_eq!(config.batch.max_total, 15);
    }
}
