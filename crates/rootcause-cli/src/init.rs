//! `rootcause init` — write a default config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use rootcause_core::config::{get_config_path, save_config, Config};

use crate::helpers;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if path.exists() && !force {
        helpers::print_info(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    save_config(&Config::default(), Some(&path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    helpers::print_success(&format!("Created config at {}", path.display()));
    Ok(())
}


