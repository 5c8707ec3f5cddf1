//! `get_schema` — column names and types of one Parquet file.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::base::{resolve_input_path, Tool, ToolOutput};
use crate::engine::EngineSession;
use crate::parser::parse_block;

const KEYS: &[&str] = &["file_path"];

pub struct SchemaTool {
    work_dir: PathBuf,
}

impl SchemaTool {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    async fn describe_one(&self, block: &str, out: &mut ToolOutput) {
        let args = parse_block(block, KEYS);
        let Some(raw) = args.get("file_path").filter(|p| !p.is_empty()) else {
            out.push_error("Error: file_path argument is required.");
            return;
        };

        let path = resolve_input_path(raw, &self.work_dir);
        let shown = path.display().to_string();

        let task_path = path.clone();
        let result = tokio::task::spawn_blocking(move || {
            let session = EngineSession::open()?;
            let rows = session.describe(&task_path)?;
            session.close();
            Ok::<_, duckdb::Error>(rows)
        })
        .await;

        match result {
            Ok(Ok(rows)) => {
                debug!(path = %shown, columns = rows.rows.len(), "described file");
                out.push_line(format!("Schema for {shown}:\n{}", rows.render_table()));
            }
            Ok(Err(e)) => {
                warn!(path = %shown, error = %e, "schema inspection failed");
                out.push_error(format!("Error inspecting schema for {shown}: {e}"));
            }
            Err(e) => out.push_error(format!("Error inspecting schema for {shown}: {e}")),
        }
    }
}

#[async_trait]
impl Tool for SchemaTool {
    fn tag(&self) -> &str {
        "get_schema"
    }

    fn name(&self) -> &str {
        "Get Schema"
    }

    fn description(&self) -> &str {
        "Get the schema of a parquet file. Usage: ```get_schema\nfile_path=logs.parquet\n```"
    }

    fn argument_keys(&self) -> &[&'static str] {
        KEYS
    }

    async fn execute(&self, blocks: &[String], _safety: bool) -> ToolOutput {
        let mut out = ToolOutput::new();
        for block in blocks {
            self.describe_one(block, &mut out).await;
        }
        out
    }
}


