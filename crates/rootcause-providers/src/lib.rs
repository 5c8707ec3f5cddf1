//! LLM provider layer for Rootcause.
//!
//! The agent only needs `generate(history) -> (answer, reasoning)`; this crate
//! supplies that contract and a client for OpenAI-compatible servers.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`error::ProviderError`] — transport/API failures (fatal to a run)
//! - [`registry`] — static specs for the supported backends
//! - [`http_provider::HttpProvider`] — generic OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`] — convenience builder from config

pub mod error;
pub mod http_provider;
pub mod registry;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderSpec, PROVIDERS};
pub use traits::LlmProvider;
