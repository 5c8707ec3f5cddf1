//! Tools addressed by fenced blocks.

pub mod base;
pub mod list_tables;
pub mod query;
pub mod registry;
pub mod schema;

pub use base::{resolve_input_path, Tool, ToolOutput};
pub use list_tables::ListTablesTool;
pub use query::QueryTool;
pub use registry::{ExecutionReport, ToolRegistry};
pub use schema::SchemaTool;
