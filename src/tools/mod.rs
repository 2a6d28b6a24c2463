//! External tool adapters
//!
//! The analyzer and the type checker are consumed as black-box capabilities
//! behind the [`Analyzer`] and [`TypeChecker`] traits, so the core pipeline
//! can be driven by in-process mocks in tests without spawning anything.
//!
//! Concrete adapters follow a common pattern:
//! 1. Run the external tool as a subprocess with `std::process::Command`
//! 2. Bound it with a poll-based timeout
//! 3. Hand the raw output to the caller for parsing

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Result from running an external tool
#[derive(Debug, Clone)]
pub struct ExternalToolResult {
    /// Whether the tool completed (a non-zero exit may still carry findings)
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Process exit code
    pub return_code: Option<i32>,
    /// Whether the tool timed out
    pub timed_out: bool,
    /// Error message if it failed to run at all
    pub error: Option<String>,
}

impl ExternalToolResult {
    fn success(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            return_code: Some(return_code),
            timed_out: false,
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: false,
            error: Some(error),
        }
    }

    fn timeout(tool_name: &str, timeout_secs: u64) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: true,
            error: Some(format!("{} timed out after {}s", tool_name, timeout_secs)),
        }
    }
}

/// Run an external tool with standard error handling.
///
/// `timeout_secs = 0` means no timeout.
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> ExternalToolResult {
    if cmd.is_empty() {
        return ExternalToolResult::failure("Empty command".to_string());
    }

    let program = &cmd[0];
    let args = &cmd[1..];

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return ExternalToolResult::failure(format!(
                    "{} not found. Please install it first.",
                    tool_name
                ));
            }
            return ExternalToolResult::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    if timeout_secs == 0 {
        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => {
                return ExternalToolResult::failure(format!(
                    "Failed to wait for {}: {}",
                    tool_name, e
                ))
            }
        };
        return ExternalToolResult::success(
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        );
    }

    // Poll for completion with small sleep intervals
    let start = std::time::Instant::now();
    let timeout = Duration::from_secs(timeout_secs);
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => {
                let output = match child.wait_with_output() {
                    Ok(output) => output,
                    Err(e) => {
                        return ExternalToolResult::failure(format!(
                            "Failed to collect output of {}: {}",
                            tool_name, e
                        ))
                    }
                };
                return ExternalToolResult::success(
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                    output.status.code().unwrap_or(-1),
                );
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", tool_name, timeout_secs);
                    return ExternalToolResult::timeout(tool_name, timeout_secs);
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return ExternalToolResult::failure(format!(
                    "Failed to wait for {}: {}",
                    tool_name, e
                ));
            }
        }
    }
}

/// Check if a tool is installed
pub fn is_tool_installed(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Static-analysis capability. Returns the raw structured report text
/// (ESLint-style JSON) for the collector to parse.
pub trait Analyzer {
    fn run_analysis(&self, scope: &Path) -> Result<String>;
}

/// Result of a type check run
#[derive(Debug, Clone)]
pub struct TypeCheckOutcome {
    pub passed: bool,
    pub diagnostics: Vec<String>,
    pub timed_out: bool,
}

/// Compile/type-check capability, used solely as a validation gate.
pub trait TypeChecker {
    fn run_type_check(&self) -> TypeCheckOutcome;
}

/// Analyzer adapter that shells out to a configured command.
pub struct CommandAnalyzer {
    command: Vec<String>,
    timeout_secs: u64,
    repo_path: PathBuf,
}

impl CommandAnalyzer {
    pub fn new(command: Vec<String>, timeout_secs: u64, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            command,
            timeout_secs,
            repo_path: repo_path.into(),
        }
    }
}

impl Analyzer for CommandAnalyzer {
    fn run_analysis(&self, scope: &Path) -> Result<String> {
        let mut cmd = self.command.clone();
        // Replace a trailing "." placeholder with the requested scope
        if cmd.last().map(String::as_str) == Some(".") {
            cmd.pop();
            cmd.push(scope.to_string_lossy().to_string());
        }

        let result = run_external_tool(&cmd, "analyzer", self.timeout_secs, Some(&self.repo_path));
        if result.timed_out {
            anyhow::bail!("analyzer timed out after {}s", self.timeout_secs);
        }
        if let Some(error) = result.error {
            anyhow::bail!("analyzer failed: {}", error);
        }
        // Linters exit non-zero when findings exist; stdout still carries
        // the report, so only an empty stdout is an error here.
        if result.stdout.trim().is_empty() {
            anyhow::bail!(
                "analyzer produced no output (exit code {:?}): {}",
                result.return_code,
                result.stderr.lines().next().unwrap_or("")
            );
        }
        Ok(result.stdout)
    }
}

/// Type checker adapter that shells out to a configured command.
pub struct CommandTypeChecker {
    command: Vec<String>,
    timeout_secs: u64,
    repo_path: PathBuf,
}

impl CommandTypeChecker {
    pub fn new(command: Vec<String>, timeout_secs: u64, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            command,
            timeout_secs,
            repo_path: repo_path.into(),
        }
    }
}

impl TypeChecker for CommandTypeChecker {
    fn run_type_check(&self) -> TypeCheckOutcome {
        let result = run_external_tool(
            &self.command,
            "type-check",
            self.timeout_secs,
            Some(&self.repo_path),
        );

        if result.timed_out {
            // A timeout is treated identically to a failed check
            return TypeCheckOutcome {
                passed: false,
                diagnostics: vec![result.error.unwrap_or_else(|| "timed out".into())],
                timed_out: true,
            };
        }
        if let Some(error) = result.error {
            return TypeCheckOutcome {
                passed: false,
                diagnostics: vec![error],
                timed_out: false,
            };
        }

        let passed = result.return_code == Some(0);
        let diagnostics = if passed {
            Vec::new()
        } else {
            result
                .stdout
                .lines()
                .chain(result.stderr.lines())
                .filter(|l| !l.trim().is_empty())
                .take(50)
                .map(String::from)
                .collect()
        };

        TypeCheckOutcome {
            passed,
            diagnostics,
            timed_out: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_fails() {
        let result = run_external_tool(&[], "none", 0, None);
        assert!(!result.success);
        assert_eq!(result.error, Some("Empty command".into()));
    }

    #[test]
    fn test_missing_binary_reports_not_found() {
        let result = run_external_tool(
            &["definitely-not-a-real-binary-xyz".into()],
            "fake",
            5,
            None,
        );
        assert!(!result.success);
        assert!(result.error.expect("error set").contains("not found"));
    }

    #[test]
    fn test_echo_captures_stdout() {
        let result = run_external_tool(&["echo".into(), "hello".into()], "echo", 5, None);
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.return_code, Some(0));
    }

    #[test]
    fn test_timeout_result_shape() {
        let result = ExternalToolResult::timeout("tsc", 60);
        assert!(result.timed_out);
        assert!(!result.success);
        assert!(result.error.expect("error set").contains("60s"));
    }
}
