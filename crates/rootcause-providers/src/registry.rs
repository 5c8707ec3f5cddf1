//! Provider registry — static specs for the supported LLM backends.
//!
//! Every backend speaks the OpenAI-compatible `/chat/completions` shape; a
//! spec only records where it lives and how it authenticates.

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name used in config (e.g. `"deepseek"`).
    pub name: &'static str,
    /// Alternative spellings accepted in config.
    pub aliases: &'static [&'static str],
    /// Human-readable name for logs. E.g. `"DeepSeek"`.
    pub display_name: &'static str,
    /// Environment variable consulted when the config has no API key.
    pub env_key: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Whether this is a local/self-hosted server (no API key needed).
    pub is_local: bool,
}

/// Complete list of supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        aliases: &[],
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        default_api_base: "https://api.openai.com/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "deepseek",
        aliases: &["dsk_deepseek"],
        display_name: "DeepSeek",
        env_key: "DEEPSEEK_API_KEY",
        default_api_base: "https://api.deepseek.com/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "openrouter",
        aliases: &[],
        display_name: "OpenRouter",
        env_key: "OPENROUTER_API_KEY",
        default_api_base: "https://openrouter.ai/api/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "groq",
        aliases: &[],
        display_name: "Groq",
        env_key: "GROQ_API_KEY",
        default_api_base: "https://api.groq.com/openai/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "together",
        aliases: &["togetherai"],
        display_name: "Together AI",
        env_key: "TOGETHER_API_KEY",
        default_api_base: "https://api.together.xyz/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "ollama",
        aliases: &[],
        display_name: "Ollama",
        env_key: "OLLAMA_API_KEY",
        default_api_base: "http://127.0.0.1:11434/v1",
        is_local: true,
    },
    ProviderSpec {
        name: "lm-studio",
        aliases: &["lmstudio", "lm_studio"],
        display_name: "LM Studio",
        env_key: "LM_STUDIO_API_KEY",
        default_api_base: "http://127.0.0.1:1234/v1",
        is_local: true,
    },
    ProviderSpec {
        name: "server",
        aliases: &["vllm"],
        display_name: "Self-hosted server",
        env_key: "SERVER_API_KEY",
        default_api_base: "http://127.0.0.1:8000/v1",
        is_local: true,
    },
];

/// Find a provider spec by name or alias (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let wanted = name.trim().to_ascii_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| spec.name == wanted || spec.aliases.contains(&wanted.as_str()))
}

/// Pick the API key: explicit config first, then the spec's env var.
pub fn resolve_api_key(configured: &str, spec: &ProviderSpec) -> Option<String> {
    resolve_api_key_with(configured, spec, |k| std::env::var(k).ok())
}

fn resolve_api_key_with(
    configured: &str,
    spec: &ProviderSpec,
    var: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if !configured.is_empty() {
        return Some(configured.to_string());
    }
    var(spec.env_key).filter(|k| !k.is_empty())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────


