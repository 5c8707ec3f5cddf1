//! Core types — conversation turns and the chat-completions wire format.
//!
//! The agent keeps its conversation as a flat, append-only list of
//! [`ConversationTurn`]s. The same shape is sent to OpenAI-compatible
//! endpoints and dumped into the final `output.json` report.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// Who produced a conversation turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the conversation history.
///
/// Serializes as `{"role": "...", "content": "..."}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// What a model call yields: the visible answer and the (possibly empty)
/// reasoning trace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Answer text, which may contain fenced tool blocks.
    pub answer: String,
    /// Reasoning/thinking content (`reasoning_content` or `<think>` tags).
    pub reasoning: String,
    /// Token usage statistics, when the backend reports them.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    pub fn new(answer: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            reasoning: reasoning.into(),
            usage: None,
        }
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Chat completion wire types
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ConversationTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_serialization() {
        let turn = ConversationTurn::user("hello");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hello"}));
    }

    #[test]
    fn test_turn_roundtrip_roles() {
        let turns = vec![
            ConversationTurn::system("sys"),
            ConversationTurn::user("u"),
            ConversationTurn::assistant("a"),
        ];
        let text = serde_json::to_string(&turns).unwrap();
        let back: Vec<ConversationTurn> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, turns);
        assert!(text.contains("\"assistant\""));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn test_request_skips_absent_fields() {
        let req = ChatCompletionRequest {
            model: "m".into(),
            messages: vec![ConversationTurn::user("x")],
            max_tokens: None,
            temperature: Some(0.2),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["temperature"], 0.2);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_deserialization_with_reasoning() {
        let raw = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": {"content": "done", "reasoning_content": "because"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        });
        let resp: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("done"));
        assert_eq!(
            resp.choices[0].message.reasoning_content.as_deref(),
            Some("because")
        );
        assert_eq!(resp.usage.unwrap().total_tokens, 5);
    }
}
