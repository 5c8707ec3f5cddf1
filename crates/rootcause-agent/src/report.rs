//! Run report — the `output.json` record written after every run.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use rootcause_core::types::ConversationTurn;
use rootcause_core::utils::truncate_with_ellipsis;

/// Characters of the query kept in the report.
pub const QUERY_PREVIEW_CHARS: usize = 500;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// The query, cut to 500 characters plus `...`.
    pub query: String,
    pub conversation_history: Vec<ConversationTurn>,
    pub final_answer: Option<String>,
    pub final_reasoning: Option<String>,
}

impl RunReport {
    pub fn new(
        query: &str,
        conversation_history: Vec<ConversationTurn>,
        final_answer: Option<String>,
        final_reasoning: Option<String>,
    ) -> Self {
        Self {
            query: truncate_with_ellipsis(query, QUERY_PREVIEW_CHARS),
            conversation_history,
            final_answer,
            final_reasoning,
        }
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), turns = self.conversation_history.len(), "report saved");
        Ok(())
    }
}


