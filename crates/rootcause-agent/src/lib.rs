//! Rootcause Agent — tool protocol, Parquet tools, and the RCA loop.
//!
//! This crate contains:
//! - **blocks** / **parser**: fenced tool blocks and their `key=value` arguments
//! - **tools**: Tool trait, registry, and the Parquet tools
//! - **engine**: per-call DuckDB session used by the tools
//! - **budget**: token budget enforcement for tool results
//! - **memory** / **context**: conversation store and prompt construction
//! - **agent_loop**: the ask → parse → execute → feed back loop
//! - **report**: the `output.json` run record

pub mod agent_loop;
pub mod blocks;
pub mod budget;
pub mod context;
pub mod engine;
pub mod memory;
pub mod parser;
pub mod report;
pub mod tools;

pub use agent_loop::{AgentReply, AgentState, RcaAgent, StopHandle, Termination, EXHAUSTED_MESSAGE};
pub use budget::{BudgetDecision, TokenBudget};
pub use context::ContextBuilder;
pub use memory::{ConversationMemory, Memory};
pub use report::RunReport;
pub use tools::{ExecutionReport, Tool, ToolOutput, ToolRegistry};
