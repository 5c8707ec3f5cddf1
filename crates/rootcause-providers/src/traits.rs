//! LLM Provider trait — the model client contract seen by the agent loop.

use async_trait::async_trait;
use rootcause_core::types::{ConversationTurn, LlmResponse};

use crate::error::ProviderError;

/// Trait that all LLM providers must implement.
///
/// The agent treats the model as an opaque function from conversation
/// history to `(answer, reasoning)`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate the next assistant answer for the given history.
    ///
    /// Errors are not retried by the caller.
    async fn generate(&self, history: &[ConversationTurn]) -> Result<LlmResponse, ProviderError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
