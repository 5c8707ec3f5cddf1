//! `list_tables_in_directory` — list the Parquet files in a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::base::{resolve_input_path, Tool, ToolOutput};
use crate::parser::parse_block;

const KEYS: &[&str] = &["directory"];

pub struct ListTablesTool {
    work_dir: PathBuf,
    extension: String,
}

impl ListTablesTool {
    pub fn new(work_dir: PathBuf, extension: &str) -> Self {
        Self {
            work_dir,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    fn list_one(&self, block: &str, out: &mut ToolOutput) {
        let args = parse_block(block, KEYS);
        let shown = match args.get("directory") {
            Some(dir) if !dir.is_empty() => dir,
            _ => ".",
        };
        let path = if shown == "." {
            self.work_dir.clone()
        } else {
            resolve_input_path(shown, &self.work_dir)
        };

        if !path.exists() {
            out.push_error(format!("Error: Directory '{shown}' does not exist."));
            return;
        }

        match self.matching_files(&path) {
            Ok(files) if files.is_empty() => {
                out.push_line(format!("No {} files found in {shown}", self.extension));
            }
            Ok(files) => {
                debug!(dir = %path.display(), count = files.len(), "listed tables");
                out.push_line(format!(
                    "{} files in {shown}:\n{}",
                    capitalize(&self.extension),
                    files.join("\n")
                ));
            }
            Err(e) => out.push_error(format!("Error listing files in {shown}: {e}")),
        }
    }

    fn matching_files(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
            if matches {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl Tool for ListTablesTool {
    fn tag(&self) -> &str {
        "list_tables_in_directory"
    }

    fn name(&self) -> &str {
        "List Tables In Directory"
    }

    fn description(&self) -> &str {
        "List all parquet files in the current directory or a specified directory. \
         Usage: ```list_tables_in_directory\ndirectory=.\n```"
    }

    fn argument_keys(&self) -> &[&'static str] {
        KEYS
    }

    async fn execute(&self, blocks: &[String], _safety: bool) -> ToolOutput {
        let mut out = ToolOutput::new();
        for block in blocks {
            self.list_one(block, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(dir: &Path) -> ListTablesTool {
        ListTablesTool::new(dir.to_path_buf(), "parquet")
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(dir.path());
        let out = t.execute(&["directory=.\n".to_string()], false).await;
        assert_eq!(out.text.trim_end(), "No parquet files found in .");
        assert!(!t.execution_failure_check(&out));
    }

    #[tokio::test]
    async fn test_lists_sorted_parquet_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["traces.parquet", "logs.parquet", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.parquet")).unwrap();

        let out = tool(dir.path()).execute(&[String::new()], false).await;
        assert_eq!(
            out.text,
            "Parquet files in .:\nlogs.parquet\ntraces.parquet\n"
        );
        assert!(!out.is_failure);
    }

    #[tokio::test]
    async fn test_relative_directory_resolved_against_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("data_sub_dir_for_listing");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("metrics.parquet"), b"").unwrap();

        let out = tool(dir.path())
            .execute(&["directory=data_sub_dir_for_listing".to_string()], false)
            .await;
        assert_eq!(
            out.text,
            "Parquet files in data_sub_dir_for_listing:\nmetrics.parquet\n"
        );
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(dir.path());
        let out = t
            .execute(&["directory=/definitely/not/here".to_string()], false)
            .await;
        assert_eq!(
            out.text,
            "Error: Directory '/definitely/not/here' does not exist.\n"
        );
        assert!(t.execution_failure_check(&out));
    }

    #[tokio::test]
    async fn test_multiple_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = tool(dir.path())
            .execute(
                &["directory=/missing_dir_xyz".to_string(), "directory=.".to_string()],
                false,
            )
            .await;
        assert_eq!(
            out.text,
            "Error: Directory '/missing_dir_xyz' does not exist.\nNo parquet files found in .\n"
        );
        assert!(out.is_failure);
    }
}
