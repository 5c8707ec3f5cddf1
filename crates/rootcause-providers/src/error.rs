//! Provider errors.
//!
//! Any of these aborts the current agent run: the loop does not retry a
//! failed model call.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("no API key configured for {provider} (set {env_key} or provider.apiKey)")]
    MissingApiKey {
        provider: &'static str,
        env_key: &'static str,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned no choices")]
    EmptyResponse { provider: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = ProviderError::Api {
            provider: "OpenAI",
            status: 429,
            body: "Rate limit exceeded".into(),
        };
        assert_eq!(err.to_string(), "OpenAI returned HTTP 429: Rate limit exceeded");
    }

    #[test]
    fn test_missing_key_mentions_env_var() {
        let err = ProviderError::MissingApiKey {
            provider: "DeepSeek",
            env_key: "DEEPSEEK_API_KEY",
        };
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }
}
