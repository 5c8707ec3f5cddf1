//! Rootcause Core — shared types, configuration, and utilities.
//!
//! This crate contains:
//! - **types**: conversation turns and the OpenAI-compatible wire format
//! - **config**: JSON configuration schema, loader, and env var overrides
//! - **utils**: path and string helpers

pub mod config;
pub mod types;
pub mod utils;
