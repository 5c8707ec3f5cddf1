//! Generic HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (hosted or local) and
//! splits the reply into the visible answer and the reasoning trace.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use rootcause_core::config::ProviderConfig;
use rootcause_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, ConversationTurn, LlmResponse,
};

use crate::error::ProviderError;
use crate::registry::{find_by_name, resolve_api_key, ProviderSpec};
use crate::traits::LlmProvider;

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generic LLM provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication (absent for local servers).
    api_key: Option<String>,
    /// Model sent with every request.
    model: String,
    max_tokens: u32,
    temperature: f64,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    /// Reference to the provider spec (display name, defaults).
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from a provider config and spec.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, ProviderError> {
        // Resolve API base: config > spec default
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let api_key = resolve_api_key(&config.api_key, spec);
        if api_key.is_none() && !(config.is_local || spec.is_local) {
            return Err(ProviderError::MissingApiKey {
                provider: spec.display_name,
                env_key: spec.env_key,
            });
        }

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(ProviderError::Client)?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            extra_headers,
            spec,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn generate(&self, history: &[ConversationTurn]) -> Result<LlmResponse, ProviderError> {
        let provider = self.spec.display_name;

        debug!(
            provider,
            model = %self.model,
            messages = history.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: history.to_vec(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .headers(self.extra_headers.clone())
            .json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|source| {
            error!(provider, error = %source, "HTTP request failed");
            ProviderError::Transport { provider, source }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider, status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|source| {
                error!(provider, error = %source, "Failed to parse LLM response");
                ProviderError::Decode { provider, source }
            })?;

        let usage = chat_resp.usage;
        let choice = chat_resp
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse { provider })?;

        let content = choice.message.content.unwrap_or_default();
        let (answer, reasoning) = match choice.message.reasoning_content {
            Some(reasoning) if !reasoning.trim().is_empty() => (content.trim().to_string(), reasoning),
            _ => split_reasoning(&content),
        };

        debug!(
            provider,
            answer_len = answer.len(),
            reasoning_len = reasoning.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        Ok(LlmResponse {
            answer,
            reasoning,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

/// Separate a `<think>…</think>` section from the answer text.
///
/// Returns `(answer, reasoning)`; reasoning is empty when no tag is present.
/// An unclosed `<think>` swallows the rest of the content as reasoning.
pub fn split_reasoning(content: &str) -> (String, String) {
    let Some(start) = content.find(THINK_OPEN) else {
        return (content.trim().to_string(), String::new());
    };
    let after_open = start + THINK_OPEN.len();
    let (reasoning, rest) = match content[after_open..].find(THINK_CLOSE) {
        Some(rel) => (
            &content[after_open..after_open + rel],
            &content[after_open + rel + THINK_CLOSE.len()..],
        ),
        None => (&content[after_open..], ""),
    };
    let answer = format!("{}{}", &content[..start], rest);
    (answer.trim().to_string(), reasoning.trim().to_string())
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an HttpProvider from the `provider` config section.
pub fn create_provider(config: &ProviderConfig) -> Result<HttpProvider, ProviderError> {
    let spec = find_by_name(&config.name)
        .ok_or_else(|| ProviderError::UnknownProvider(config.name.clone()))?;

    debug!(
        provider = spec.display_name,
        model = %config.model,
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM provider"
    );

    HttpProvider::new(config, spec)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────


