//! Rootcause CLI — entry point.
//!
//! # Commands
//!
//! - `rootcause analyze [--problem FILE] [--work-dir DIR]` — run the RCA agent
//! - `rootcause status` — show configuration and provider status
//! - `rootcause init` — write a default `rootcause.json`

mod analyze;
mod helpers;
mod init;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Rootcause — root cause analysis agent over Parquet files
#[derive(Parser)]
#[command(name = "rootcause", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ./rootcause.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Investigate the problem described in the work directory
    Analyze(analyze::AnalyzeArgs),

    /// Show configuration and provider status
    Status,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze(args) => {
            init_logging(args.logs);
            analyze::run(config_path, args).await
        }
        Commands::Status => status::run(config_path),
        Commands::Init { force } => init::run(config_path, force),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("rootcause=debug,rootcause_agent=debug,rootcause_providers=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
