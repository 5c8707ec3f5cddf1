//! `rootcause status` — show configuration and provider status.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use rootcause_core::config::{get_config_path, load_config};
use rootcause_core::utils::resolve_work_dir;
use rootcause_providers::registry::{find_by_name, resolve_api_key, PROVIDERS};

use crate::helpers::check_mark;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config(Some(&path));

    println!();
    println!("{}", "Rootcause Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        check_mark(path.exists(), "(not found, using defaults)")
    );

    let work_dir = resolve_work_dir(&config.agent.work_dir);
    println!(
        "  {:<18} {} {}",
        "Work dir:".bold(),
        work_dir.display(),
        check_mark(work_dir.is_dir(), "(not found)")
    );

    let problem = work_dir.join(&config.agent.problem_file);
    println!(
        "  {:<18} {} {}",
        "Problem file:".bold(),
        config.agent.problem_file,
        check_mark(problem.is_file(), "(not found)")
    );

    println!(
        "  {:<18} {}",
        "Data files:".bold(),
        count_files(&work_dir, &config.tools.file_extension)
    );

    println!(
        "  {:<18} {} | tokenLimit: {} | rows: {}",
        "Limits:".bold(),
        format!("maxAttempts: {}", config.agent.max_attempts).dimmed(),
        config.tools.token_limit,
        config.tools.default_row_limit,
    );

    // Provider
    println!();
    println!("  {}", "Provider:".bold());
    match find_by_name(&config.provider.name) {
        Some(spec) => {
            let key_status = if spec.is_local || config.provider.is_local {
                format!("{} (local)", "✓".green())
            } else if resolve_api_key(&config.provider.api_key, spec).is_some() {
                format!("{} (key set)", "✓".green())
            } else {
                format!("{} set {} or provider.apiKey", "✗".red(), spec.env_key)
            };
            println!("    {:<20} {}", spec.display_name, key_status);
            println!("    {:<20} {}", "Model", config.provider.model);
            println!(
                "    {:<20} {}",
                "API base",
                config
                    .provider
                    .api_base
                    .as_deref()
                    .unwrap_or(spec.default_api_base)
            );
        }
        None => {
            let known: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
            println!(
                "    {} unknown provider '{}' (known: {})",
                "✗".red(),
                config.provider.name,
                known.join(", ")
            );
        }
    }
    println!();

    Ok(())
}

fn count_files(dir: &Path, extension: &str) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
                })
                .count()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.parquet"), b"").unwrap();
        std::fs::write(dir.path().join("b.PARQUET"), b"").unwrap();
        std::fs::write(dir.path().join("c.csv"), b"").unwrap();
        assert_eq!(count_files(dir.path(), "parquet"), 2);
        assert_eq!(count_files(&dir.path().join("missing"), "parquet"), 0);
    }
}
