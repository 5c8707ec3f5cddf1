//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration — loaded from `rootcause.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Settings for the RCA agent loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Display name used in logs and the system prompt.
    pub name: String,
    /// Hard ceiling on model rounds that request tools.
    pub max_attempts: usize,
    /// Directory the tools operate in (relative paths resolve against it).
    pub work_dir: String,
    /// Optional system prompt file; the built-in prompt is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<String>,
    /// Problem description sidecar, looked up inside `work_dir`.
    pub problem_file: String,
    /// Where the final report is written (relative to the current directory).
    pub output_file: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "RCA Agent".to_string(),
            max_attempts: 15,
            work_dir: ".".to_string(),
            prompt_path: None,
            problem_file: "problem.json".to_string(),
            output_file: "output.json".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Which LLM backend to talk to and how.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Registry name (e.g. `"openai"`, `"deepseek"`, `"ollama"`).
    pub name: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// API key for Bearer authentication (empty for local servers).
    pub api_key: String,
    /// Custom API base URL (overrides the registry default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Whether the server runs locally (no API key required).
    pub is_local: bool,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: String::new(),
            api_base: None,
            is_local: false,
            max_tokens: 4096,
            temperature: 0.7,
            extra_headers: None,
        }
    }
}

impl ProviderConfig {
    /// Whether this provider can be called (local, or has an API key).
    pub fn is_configured(&self) -> bool {
        self.is_local || !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Settings shared by the Parquet tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Estimated-token ceiling for a single query result.
    pub token_limit: usize,
    /// Rows returned by `query_parquet_files` when no `limit` is given.
    pub default_row_limit: usize,
    /// Extension (without dot) of the columnar files the tools look for.
    pub file_extension: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            token_limit: 5000,
            default_row_limit: 10,
            file_extension: "parquet".to_string(),
        }
    }
}


