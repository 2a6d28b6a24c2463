//! Init command - initialize a repository for batch remediation

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::state;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    println!("\n{} Initializing Lintsweep\n", style("🧹").bold());

    let state_dir = state::state_dir(&repo_path);
    if state_dir.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(state_dir.display()).cyan()
        );
    } else {
        state::ensure_state_dir(&repo_path)
            .with_context(|| "Failed to create .lintsweep directory")?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(state_dir.display()).cyan()
        );
    }

    let config_path = repo_path.join(ProjectConfig::FILENAME);
    if config_path.exists() {
        println!(
            "{} {} already exists, leaving it untouched",
            style("✓").green(),
            style(ProjectConfig::FILENAME).cyan()
        );
    } else {
        std::fs::write(&config_path, ProjectConfig::example_toml())
            .with_context(|| "Failed to create config file")?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(ProjectConfig::FILENAME).cyan()
        );
    }

    // Keep batch state out of version control
    let gitignore_path = repo_path.join(".gitignore");
    let gitignore_entry = "\n# Lintsweep\n.lintsweep/\n";
    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path).unwrap_or_default();
        if !content.contains(".lintsweep") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            use std::io::Write;
            file.write_all(gitignore_entry.as_bytes())?;
            println!(
                "{} Added .lintsweep/ to {}",
                style("✓").green(),
                style(".gitignore").cyan()
            );
        }
    }

    println!("\n{} Repository initialized!", style("✨").bold());
    println!("\nNext steps:");
    println!("  {} Record the starting count", style("lintsweep baseline .").cyan());
    println!("  {} Collect and classify", style("lintsweep analyze .").cyan());
    println!("  {} Plan batches (dry run)", style("lintsweep batch .").cyan());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_state_and_config() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join(".gitignore"), "node_modules/\n").expect("gitignore");

        run(dir.path()).expect("init");

        assert!(state::state_dir(dir.path()).exists());
        let config = std::fs::read_to_string(dir.path().join(ProjectConfig::FILENAME))
            .expect("config written");
        assert!(config.contains("[batch]"));
        let gitignore =
            std::fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore read");
        assert!(gitignore.contains(".lintsweep/"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        run(dir.path()).expect("first init");
        std::fs::write(
            dir.path().join(ProjectConfig::FILENAME),
            "[batch]\nmax_total = 3\n",
        )
        .expect("custom config");

        run(dir.path()).expect("second init");
        let config = std::fs::read_to_string(dir.path().join(ProjectConfig::FILENAME))
            .expect("config read");
        assert!(config.contains("max_total = 3"));
    }
}
