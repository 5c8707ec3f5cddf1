//! Tool Registry — maps fence tags to tools and runs a round of blocks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rootcause_core::config::ToolsConfig;
use tracing::{debug, info, warn};

use super::base::{Tool, ToolOutput};
use super::list_tables::ListTablesTool;
use super::query::QueryTool;
use super::schema::SchemaTool;
use crate::blocks::FencedBlock;
use crate::budget::TokenBudget;

/// Outcome of executing every block in one model answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Feedback for the next model turn, one section per tool.
    pub feedback: String,
    /// False when any tool reported a failure.
    pub success: bool,
    /// Number of tools that ran.
    pub executed: usize,
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Tools keyed by tag, built once at startup.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with the three Parquet tools rooted at `work_dir`.
    pub fn rca(work_dir: PathBuf, config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ListTablesTool::new(
            work_dir.clone(),
            &config.file_extension,
        )));
        registry.register(Arc::new(SchemaTool::new(work_dir.clone())));
        registry.register(Arc::new(QueryTool::new(
            work_dir,
            TokenBudget::new(config.token_limit),
            config.default_row_limit,
        )));
        registry
    }

    /// Register a tool. Replaces any tool with the same tag.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.tag(), "registered tool");
        self.tools.insert(tool.tag().to_string(), tool);
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(tag)
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tools.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tools.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Tool catalogue for the system prompt.
    pub fn describe(&self) -> String {
        self.tags()
            .iter()
            .filter_map(|tag| self.tools.get(tag))
            .map(|tool| format!("- {} ({}): {}", tool.tag(), tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run `blocks` through the tool registered for `tag`.
    ///
    /// Unknown tags are ignored and yield `None`.
    pub async fn dispatch(&self, tag: &str, blocks: &[String]) -> Option<ToolOutput> {
        let Some(tool) = self.tools.get(tag) else {
            debug!(tag, "no tool registered for tag, skipping");
            return None;
        };
        debug!(tool = tag, blocks = blocks.len(), "dispatching");
        Some(tool.execute(blocks, false).await)
    }

    /// Execute every block of one answer.
    ///
    /// Blocks are grouped by tag in order of first appearance and each tool
    /// runs once with all of its blocks. A failing tool never stops the
    /// others.
    pub async fn execute_blocks(&self, blocks: &[FencedBlock]) -> ExecutionReport {
        let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
        for block in blocks {
            match groups.iter_mut().find(|(tag, _)| *tag == block.tag) {
                Some((_, bodies)) => bodies.push(block.body.clone()),
                None => groups.push((block.tag.as_str(), vec![block.body.clone()])),
            }
        }

        let mut report = ExecutionReport {
            success: true,
            ..Default::default()
        };
        let mut sections = Vec::new();

        for (tag, bodies) in groups {
            let Some(output) = self.dispatch(tag, &bodies).await else {
                continue;
            };
            let Some(tool) = self.tools.get(tag) else {
                continue;
            };
            let failed = tool.execution_failure_check(&output);
            if failed {
                warn!(tool = tag, "tool reported a failure");
                report.success = false;
            }
            report.executed += 1;
            sections.push(format!(
                "[{tag}] execution result:\n{}",
                tool.interpreter_feedback(&output).trim_end()
            ));
        }

        report.feedback = sections.join("\n\n");
        report
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}


