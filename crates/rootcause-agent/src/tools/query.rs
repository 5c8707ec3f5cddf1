//! `query_parquet_files` — run SQL over Parquet files registered as views.
//!
//! Each block gets its own engine session. Files are exposed under their
//! stem (`logs.parquet` → `logs`), with `_1`, `_2`, … appended on
//! collisions in file order. Rows come back as pretty JSON, cut to `limit`,
//! and pass through the token budget.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rootcause_core::utils::file_stem;
use tracing::{debug, warn};

use super::base::{resolve_input_path, Tool, ToolOutput};
use crate::budget::TokenBudget;
use crate::engine::{EngineSession, QueryRows};
use crate::parser::{parse_block, parse_file_list};

const KEYS: &[&str] = &["parquet_files", "query", "limit"];

/// Default number of rows returned when a block has no `limit`.
pub const DEFAULT_ROW_LIMIT: usize = 10;

const BUDGET_CONTEXT: &str = "query_parquet_files";

pub struct QueryTool {
    work_dir: PathBuf,
    budget: TokenBudget,
    default_limit: usize,
}

/// What one engine session produced.
struct SessionRun {
    missing: Vec<PathBuf>,
    rows: duckdb::Result<QueryRows>,
}

impl QueryTool {
    pub fn new(work_dir: PathBuf, budget: TokenBudget, default_limit: usize) -> Self {
        Self {
            work_dir,
            budget,
            default_limit,
        }
    }

    async fn query_one(&self, block: &str, out: &mut ToolOutput) {
        let args = parse_block(block, KEYS);

        let Some(sql) = args.get("query").filter(|q| !q.is_empty()) else {
            out.push_error("Error: query argument is required.");
            return;
        };

        let limit = match args.get("limit").filter(|l| !l.is_empty()) {
            None => self.default_limit,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    out.push_error(format!(
                        "Error: limit must be a non-negative integer, got '{raw}'."
                    ));
                    return;
                }
            },
        };

        let files: Vec<PathBuf> = parse_file_list(args.get("parquet_files").unwrap_or("[]"))
            .iter()
            .map(|f| resolve_input_path(f, &self.work_dir))
            .collect();

        let sql = sql.to_string();
        let run = tokio::task::spawn_blocking(move || run_session(&files, &sql)).await;

        let run = match run {
            Ok(run) => run,
            Err(e) => {
                out.push_error(format!("Error executing query: {e}"));
                return;
            }
        };

        for path in &run.missing {
            out.push_error(format!("Error: Parquet file not found: {}", path.display()));
        }

        match run.rows {
            Ok(rows) => {
                let total = rows.rows.len();
                let mut records = rows.into_records();
                records.truncate(limit);
                debug!(rows = total, returned = records.len(), limit, "query finished");

                match serde_json::to_string_pretty(&records) {
                    Ok(payload) => out.push_line(self.budget.enforce(&payload, BUDGET_CONTEXT)),
                    Err(e) => out.push_error(format!("Error executing query: {e}")),
                }
            }
            Err(e) => {
                warn!(error = %e, "query failed");
                out.push_error(format!("Error executing query: {e}"));
            }
        }
    }
}

/// Open a session, register every existing file, run `sql`.
fn run_session(files: &[PathBuf], sql: &str) -> SessionRun {
    let mut missing = Vec::new();
    let rows = query_files(files, sql, &mut missing);
    SessionRun { missing, rows }
}

/// The session is closed on every path out of this function.
fn query_files(
    files: &[PathBuf],
    sql: &str,
    missing: &mut Vec<PathBuf>,
) -> duckdb::Result<QueryRows> {
    let mut session = EngineSession::open()?;
    for path in files {
        if !path.exists() {
            missing.push(path.clone());
            continue;
        }
        register(&mut session, path)?;
    }
    let rows = session.query(sql)?;
    session.close();
    Ok(rows)
}

fn register(session: &mut EngineSession, path: &Path) -> duckdb::Result<()> {
    let view = session.register_view(&file_stem(path), path)?;
    debug!(view = %view, path = %path.display(), "file registered");
    Ok(())
}

#[async_trait]
impl Tool for QueryTool {
    fn tag(&self) -> &str {
        "query_parquet_files"
    }

    fn name(&self) -> &str {
        "Query Parquet Files"
    }

    fn description(&self) -> &str {
        "Execute SQL queries on parquet files using DuckDB. Usage: \
         ```query_parquet_files\nparquet_files=['file1.parquet', 'file2.parquet']\n\
         query=SELECT * FROM file1 JOIN file2 ...\nlimit=10\n```"
    }

    fn argument_keys(&self) -> &[&'static str] {
        KEYS
    }

    async fn execute(&self, blocks: &[String], _safety: bool) -> ToolOutput {
        let mut out = ToolOutput::new();
        for block in blocks {
            self.query_one(block, &mut out).await;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BUDGET_ERROR_TAG;
    use crate::engine::write_parquet;
    use serde_json::{json, Value};

    fn tool(dir: &Path) -> QueryTool {
        QueryTool::new(dir.to_path_buf(), TokenBudget::default(), DEFAULT_ROW_LIMIT)
    }

    fn hundred_rows(dir: &Path) {
        write_parquet(
            &dir.join("logs.parquet"),
            "SELECT range AS id, CASE WHEN range % 10 = 0 THEN 'ERROR' ELSE 'INFO' END AS level, \
             TIMESTAMP '2024-01-01 00:00:00' + to_seconds(range) AS ts FROM range(100)",
        );
    }

    #[tokio::test]
    async fn test_count_star() {
        let dir = tempfile::tempdir().unwrap();
        hundred_rows(dir.path());
        let t = tool(dir.path());

        let block = "parquet_files=['logs.parquet']\nquery=SELECT COUNT(*) FROM logs\nlimit=5\n";
        let out = t.execute(&[block.to_string()], false).await;

        assert!(!t.execution_failure_check(&out), "{}", out.text);
        let parsed: Value = serde_json::from_str(out.text.trim_end()).unwrap();
        assert_eq!(parsed, json!([{"count_star()": 100}]));
    }

    #[tokio::test]
    async fn test_multiline_query_with_equals_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        hundred_rows(dir.path());

        let block = "parquet_files=['logs.parquet']\n\
                     query=SELECT id, level, ts\nFROM logs\nWHERE level='ERROR'\nORDER BY id\n\
                     limit=3";
        let out = tool(dir.path()).execute(&[block.to_string()], false).await;

        let parsed: Value = serde_json::from_str(out.text.trim_end()).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"id": 0, "level": "ERROR", "ts": "2024-01-01T00:00:00"},
                {"id": 10, "level": "ERROR", "ts": "2024-01-01T00:00:10"},
                {"id": 20, "level": "ERROR", "ts": "2024-01-01T00:00:20"}
            ])
        );
    }

    #[tokio::test]
    async fn test_default_limit_applied() {
        let dir = tempfile::tempdir().unwrap();
        hundred_rows(dir.path());

        let block = "parquet_files=logs.parquet\nquery=SELECT id FROM logs ORDER BY id";
        let out = tool(dir.path()).execute(&[block.to_string()], false).await;
        let parsed: Vec<Value> = serde_json::from_str(out.text.trim_end()).unwrap();
        assert_eq!(parsed.len(), DEFAULT_ROW_LIMIT);
    }

    #[tokio::test]
    async fn test_collision_views() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        write_parquet(&dir.path().join("a/logs.parquet"), "SELECT 'first' AS src");
        write_parquet(&dir.path().join("b/logs.parquet"), "SELECT 'second' AS src");

        let block = "parquet_files=['a/logs.parquet', 'b/logs.parquet']\n\
                     query=SELECT logs.src AS x, logs_1.src AS y FROM logs, logs_1";
        let out = tool(dir.path()).execute(&[block.to_string()], false).await;

        let parsed: Value = serde_json::from_str(out.text.trim_end()).unwrap();
        assert_eq!(parsed, json!([{"x": "first", "y": "second"}]));
    }

    #[tokio::test]
    async fn test_missing_file_does_not_abort_others() {
        let dir = tempfile::tempdir().unwrap();
        hundred_rows(dir.path());

        let block = "parquet_files=['ghost_file_zz.parquet', 'logs.parquet']\n\
                     query=SELECT COUNT(*) AS n FROM logs";
        let out = tool(dir.path()).execute(&[block.to_string()], false).await;

        assert!(out.is_failure);
        let mut lines = out.text.splitn(2, '\n');
        assert_eq!(
            lines.next().unwrap(),
            "Error: Parquet file not found: ghost_file_zz.parquet"
        );
        let rest: Value = serde_json::from_str(lines.next().unwrap().trim_end()).unwrap();
        assert_eq!(rest, json!([{"n": 100}]));
    }

    #[tokio::test]
    async fn test_bad_table_is_inline_error() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(dir.path());
        let out = t
            .execute(&["query=SELECT * FROM no_such_table".to_string()], false)
            .await;
        assert!(out.text.starts_with("Error executing query:"));
        assert!(t.execution_failure_check(&out));
    }

    #[tokio::test]
    async fn test_missing_query_and_bad_limit() {
        let dir = tempfile::tempdir().unwrap();
        let out = tool(dir.path())
            .execute(
                &[
                    "parquet_files=['logs.parquet']".to_string(),
                    "query=SELECT 1\nlimit=ten".to_string(),
                ],
                false,
            )
            .await;
        assert_eq!(
            out.text,
            "Error: query argument is required.\n\
             Error: limit must be a non-negative integer, got 'ten'.\n"
        );
    }

    #[tokio::test]
    async fn test_oversized_result_replaced_by_warning() {
        let dir = tempfile::tempdir().unwrap();
        write_parquet(
            &dir.path().join("wide.parquet"),
            "SELECT range AS id, repeat('x', 300) AS payload FROM range(200)",
        );

        let block = "parquet_files=['wide.parquet']\nquery=SELECT * FROM wide\nlimit=200";
        let t = tool(dir.path());
        let out = t.execute(&[block.to_string()], false).await;

        assert!(!t.execution_failure_check(&out));
        let warning: Value = serde_json::from_str(out.text.trim_end()).unwrap();
        assert_eq!(warning["error"], BUDGET_ERROR_TAG);
        assert_eq!(warning["context"], "query_parquet_files");
        assert_eq!(warning["rows_returned"], 200);
        assert!(warning["suggested_limit"].as_u64().unwrap() <= 200);
    }

    #[tokio::test]
    async fn test_blocks_get_independent_sessions() {
        let dir = tempfile::tempdir().unwrap();
        hundred_rows(dir.path());

        let first = "parquet_files=['logs.parquet']\nquery=SELECT COUNT(*) AS n FROM logs";
        let second = "query=SELECT COUNT(*) AS n FROM logs";
        let out = tool(dir.path())
            .execute(&[first.to_string(), second.to_string()], false)
            .await;

        assert!(out.is_failure);
        assert!(out.text.contains("\"n\": 100"));
        assert!(out.text.contains("Error executing query:"));
    }
}
