//! Context builder — system prompt and per-run environment context.
//!
//! The initial user prompt is augmented with a system-info block: host,
//! working directory, and the problem description read from the
//! `problem.json` sidecar in the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::tools::ToolRegistry;

/// Default sidecar holding the problem description.
pub const DEFAULT_PROBLEM_FILE: &str = "problem.json";

pub struct ContextBuilder {
    work_dir: PathBuf,
    agent_name: String,
    problem_file: String,
}

impl ContextBuilder {
    pub fn new(work_dir: impl Into<PathBuf>, agent_name: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            agent_name: agent_name.into(),
            problem_file: DEFAULT_PROBLEM_FILE.to_string(),
        }
    }

    /// Use a different sidecar file (builder pattern). Relative names are
    /// looked up in the working directory; absolute paths are used as-is.
    pub fn with_problem_file(mut self, name: impl Into<String>) -> Self {
        self.problem_file = name.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    // ────────────── Problem description ──────────────

    /// Sidecar contents as free text.
    ///
    /// Missing file → empty string. A read failure is reported as text.
    pub fn read_problem(&self) -> String {
        let path = self.work_dir.join(&self.problem_file);
        if !path.exists() {
            return String::new();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded problem description");
                content
            }
            Err(e) => format!("Error reading {}: {e}", self.problem_file),
        }
    }

    // ────────────── Prompt augmentation ──────────────

    /// Environment block appended to the initial prompt.
    pub fn system_info(&self) -> String {
        let work_dir = self.work_dir.display();
        format!(
            "System Info:\n\
             OS: {os} {arch}\n\
             Runtime: Rust (rootcause-agent {version})\n\
             \n\
             Current Working Directory: {work_dir}\n\
             Target Directory for Analysis: {work_dir}\n\
             \n\
             Problem Description:\n{problem}",
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            version = env!("CARGO_PKG_VERSION"),
            problem = self.read_problem(),
        )
    }

    /// `prompt` followed by the system-info block.
    pub fn augment(&self, prompt: &str) -> String {
        format!("{prompt}\n\n{}", self.system_info())
    }

    // ────────────── System prompt ──────────────

    /// Load the system prompt from `prompt_path`, or build the default one.
    pub fn system_prompt(&self, prompt_path: Option<&Path>, tools: &ToolRegistry) -> Result<String> {
        match prompt_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt file {}", path.display())),
            None => Ok(self.default_system_prompt(tools)),
        }
    }

    /// Built-in prompt describing the block protocol and the tools.
    pub fn default_system_prompt(&self, tools: &ToolRegistry) -> String {
        format!(
            "You are {name}, an expert at root cause analysis over Parquet data.\n\
             \n\
             You investigate by calling tools. To call a tool, write a fenced block \
             whose first line is the tool tag, followed by key=value lines:\n\
             \n\
             ```query_parquet_files\n\
             parquet_files=['logs.parquet']\n\
             query=SELECT level, COUNT(*) FROM logs GROUP BY level\n\
             limit=10\n\
             ```\n\
             \n\
             Tables are named after the file name without its extension. \
             Values may span several lines. You may call several tools in one answer; \
             their results come back in the next message.\n\
             \n\
             Available tools:\n{catalogue}\n\
             \n\
             Start by listing the tables, inspect the schemas you need, then query. \
             Keep results small with LIMIT, WHERE and aggregation.\n\
             When you have found the root cause, answer without any fenced block.",
            name = self.agent_name,
            catalogue = tools.describe(),
        )
    }
}


