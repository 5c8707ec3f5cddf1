//! `rootcause analyze` — run the RCA agent and write `output.json`.
//!
//! The report is written whether the run succeeds or fails, so a failed
//! run can still be inspected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info, warn};

use rootcause_agent::{RcaAgent, RunReport, Termination};
use rootcause_core::config::{load_config, Config};
use rootcause_core::utils::resolve_work_dir;
use rootcause_providers::create_provider;

use crate::helpers;

const PROBLEM_SUFFIX: &str =
    "Please follow the instructions above to analyze the parquet files in the current directory.";

const DEFAULT_QUERY: &str = "Follow the workflow in the Problem Description to analyze the parquet files in the current directory.";

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Directory holding the Parquet files (overrides agent.workDir)
    #[arg(short, long)]
    pub work_dir: Option<String>,

    /// Problem description file (default: <work-dir>/problem.json)
    #[arg(short, long)]
    pub problem: Option<PathBuf>,

    /// Maximum model rounds (overrides agent.maxAttempts)
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Report file (default: ./output.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub logs: bool,
}

/// Fold command-line overrides into the loaded config.
fn apply_args(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(dir) = &args.work_dir {
        config.agent.work_dir = dir.clone();
    }
    if let Some(n) = args.max_attempts {
        config.agent.max_attempts = n;
    }
    if let Some(path) = &args.problem {
        config.agent.problem_file = absolute(path).to_string_lossy().into_owned();
    }
}

/// `path` against the current directory, so joining it onto the work
/// directory later leaves it unchanged.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// The question sent to the agent: the problem text plus an instruction, or
/// a generic instruction when there is no problem file.
pub fn build_query(problem_path: &Path) -> Result<String> {
    if !problem_path.exists() {
        return Ok(DEFAULT_QUERY.to_string());
    }
    let problem = std::fs::read_to_string(problem_path)
        .with_context(|| format!("failed to read {}", problem_path.display()))?;
    Ok(format!("{problem}\n\n{PROBLEM_SUFFIX}"))
}

fn optional(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

pub async fn run(config_path: Option<&Path>, args: AnalyzeArgs) -> Result<()> {
    helpers::print_status("Initializing Auto Analysis...");

    let mut config = load_config(config_path);
    apply_args(&mut config, &args);

    let work_dir = resolve_work_dir(&config.agent.work_dir);
    if !work_dir.is_dir() {
        bail!("work directory {} does not exist", work_dir.display());
    }

    let problem_path = work_dir.join(&config.agent.problem_file);
    let query = build_query(&problem_path)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.agent.output_file));

    let provider = create_provider(&config.provider).context("failed to create LLM provider")?;
    let mut agent = RcaAgent::from_config(Arc::new(provider), &config, work_dir.clone())?;

    let stop = agent.stop_handle();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received Ctrl+C, stopping after the current step");
            helpers::print_warning("Stopping after the current step...");
            stop.request_stop();
        }
    });

    info!(work_dir = %work_dir.display(), model = %config.provider.model, "starting analysis");
    helpers::print_info("Starting analysis...");

    let outcome = agent.process(&query).await;
    signal_task.abort();

    let (answer, reasoning) = match &outcome {
        Ok(reply) => (reply.answer.clone(), reply.reasoning.clone()),
        Err(_) => (
            agent.state().last_answer.clone(),
            agent.state().last_reasoning.clone(),
        ),
    };
    let report = RunReport::new(
        &query,
        agent.history(),
        optional(&answer),
        optional(&reasoning),
    );
    let saved = report.save(&output_path);

    match outcome {
        Ok(reply) => {
            helpers::print_final_answer(&reply.answer);
            if reply.termination != Termination::Answered {
                helpers::print_warning(&format!("Run ended: {:?}", reply.termination));
            }
            saved?;
            helpers::print_success(&format!("Output saved to {}", display_path(&output_path)));
            Ok(())
        }
        Err(e) => {
            match saved {
                Ok(()) => helpers::print_info(&format!(
                    "Partial output saved to {}",
                    display_path(&output_path)
                )),
                Err(save_err) => error!(error = %save_err, "failed to save partial report"),
            }
            helpers::print_failure(&format!("An error occurred: {e:#}"));
            Err(e)
        }
    }
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}


