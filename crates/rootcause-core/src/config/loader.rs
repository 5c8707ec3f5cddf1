//! Config loader — reads `rootcause.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file (default `./rootcause.json`)
//! 3. Environment variables `ROOTCAUSE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "rootcause.json";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `ROOTCAUSE_AGENT__MAX_ATTEMPTS` → `agent.max_attempts`
/// - `ROOTCAUSE_AGENT__WORK_DIR` → `agent.work_dir`
/// - `ROOTCAUSE_AGENT__PROMPT_PATH` → `agent.prompt_path`
/// - `ROOTCAUSE_PROVIDER__NAME` / `__MODEL` / `__API_KEY` / `__API_BASE`
/// - `ROOTCAUSE_PROVIDER__IS_LOCAL`
/// - `ROOTCAUSE_TOOLS__TOKEN_LIMIT` → `tools.token_limit`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Override logic, parameterized over the variable lookup so it can be tested
/// without touching the process environment.
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(n) = var("ROOTCAUSE_AGENT__MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.agent.max_attempts = n;
    }
    if let Some(val) = var("ROOTCAUSE_AGENT__WORK_DIR") {
        config.agent.work_dir = val;
    }
    if let Some(val) = var("ROOTCAUSE_AGENT__PROMPT_PATH") {
        config.agent.prompt_path = Some(val);
    }

    if let Some(val) = var("ROOTCAUSE_PROVIDER__NAME") {
        config.provider.name = val;
    }
    if let Some(val) = var("ROOTCAUSE_PROVIDER__MODEL") {
        config.provider.model = val;
    }
    if let Some(val) = var("ROOTCAUSE_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = var("ROOTCAUSE_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }
    if let Some(val) = var("ROOTCAUSE_PROVIDER__IS_LOCAL") {
        config.provider.is_local = val == "true" || val == "1";
    }

    if let Some(n) = var("ROOTCAUSE_TOOLS__TOKEN_LIMIT").and_then(|v| v.parse().ok()) {
        config.tools.token_limit = n;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/rootcause.json"));
        assert_eq!(config.agent.max_attempts, 15);
        assert_eq!(config.tools.token_limit, 5000);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": { "maxAttempts": 4, "workDir": "/data" },
            "provider": { "name": "ollama", "model": "qwen3:14b", "isLocal": true }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_attempts, 4);
        assert_eq!(config.agent.work_dir, "/data");
        assert_eq!(config.provider.name, "ollama");
        assert!(config.provider.is_local);
        // Default preserved
        assert_eq!(config.provider.temperature, 0.7);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_attempts, 15);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rootcause.json");

        let mut config = Config::default();
        config.provider.model = "deepseek-chat".to_string();
        config.tools.default_row_limit = 25;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.provider.model, "deepseek-chat");
        assert_eq!(reloaded.tools.default_row_limit, 25);
    }

    #[test]
    fn test_overrides_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ROOTCAUSE_AGENT__MAX_ATTEMPTS", "7"),
            ("ROOTCAUSE_PROVIDER__API_KEY", "sk-env"),
            ("ROOTCAUSE_PROVIDER__IS_LOCAL", "1"),
            ("ROOTCAUSE_TOOLS__TOKEN_LIMIT", "1200"),
        ]);
        let config = apply_overrides(Config::default(), |k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.agent.max_attempts, 7);
        assert_eq!(config.provider.api_key, "sk-env");
        assert!(config.provider.is_local);
        assert_eq!(config.tools.token_limit, 1200);
    }

    #[test]
    fn test_unparseable_override_ignored() {
        let config = apply_overrides(Config::default(), |k| {
            (k == "ROOTCAUSE_AGENT__MAX_ATTEMPTS").then(|| "many".to_string())
        });
        assert_eq!(config.agent.max_attempts, 15);
    }
}
