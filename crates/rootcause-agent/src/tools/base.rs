//! Tool trait — the contract every fenced-block tool implements.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

// ─────────────────────────────────────────────
// ToolOutput
// ─────────────────────────────────────────────

/// Report produced by one `execute` call.
///
/// `text` is what the model reads: one paragraph per block, in block order.
/// `is_failure` is set whenever an `Error…` line was written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_failure: bool,
}

impl ToolOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful paragraph.
    pub fn push_line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Append an error paragraph and mark the output as failed.
    pub fn push_error(&mut self, line: impl AsRef<str>) {
        self.push_line(line);
        self.is_failure = true;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every tool implements this trait.
///
/// The registry routes blocks by `tag()`; the prompt shows `description()`
/// so the model knows the block syntax.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Fence tag that addresses this tool (e.g. `"get_schema"`).
    fn tag(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Description with a usage example, shown to the model.
    fn description(&self) -> &str;

    /// Argument keys that open a new `key=value` entry in a block.
    fn argument_keys(&self) -> &[&'static str];

    /// Run every block addressed to this tool.
    ///
    /// Never fails past its own boundary: problems are rendered inline.
    async fn execute(&self, blocks: &[String], safety: bool) -> ToolOutput;

    /// Whether `output` reports a failure.
    fn execution_failure_check(&self, output: &ToolOutput) -> bool {
        output.is_failure
    }

    /// Text fed back to the model for `output`.
    fn interpreter_feedback(&self, output: &ToolOutput) -> String {
        output.text.clone()
    }
}

// ─────────────────────────────────────────────
// Path helper
// ─────────────────────────────────────────────

/// Resolve a path argument against the working directory.
///
/// Absolute paths and relative paths that exist as given are kept. Otherwise
/// `work_dir/raw` is used when it exists. Failing both, the path is returned
/// as given so the caller can report it.
pub fn resolve_input_path(raw: &str, work_dir: &Path) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() || path.exists() {
        return path;
    }
    let joined = work_dir.join(&path);
    if joined.exists() {
        joined
    } else {
        path
    }
}


