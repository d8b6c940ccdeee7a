//! Request and response types for OpenAI-compatible chat completions.
//!
//! Covers the subset of the protocol the engine uses: chat messages with
//! optional tool calls, function-style tool definitions, and the completion
//! envelope. Unknown response fields are ignored on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Request types
// ============================================================================

/// A chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion length cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Available tools, omitted entirely when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDef>>,
    /// Tool selection policy ("auto"), only sent alongside tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt.
    System,
    /// End user.
    User,
    /// The model.
    Assistant,
    /// A tool result.
    Tool,
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Text content. `None` on assistant turns that only call tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// For `Role::Tool` messages, which call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Build a plain assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Build a tool-result message answering `call_id`.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool call requested by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool-result message.
    pub id: String,
    /// Always "function".
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function to invoke.
    pub function: FunctionCall,
}

/// The function portion of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name.
    pub name: String,
    /// JSON-encoded arguments. The protocol sends these as a string.
    pub arguments: String,
}

/// A tool made available to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function signature.
    pub function: FunctionDef,
}

/// Function signature of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDef {
    /// Tool name.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON Schema of the parameters.
    pub parameters: Value,
}

impl ToolDef {
    /// Build a function tool definition.
    #[must_use]
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

/// A chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    /// Completion identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Model that produced the completion.
    #[serde(default)]
    pub model: Option<String>,
    /// Completion choices; the engine only ever reads the first.
    pub choices: Vec<Choice>,
    /// Token accounting, when provided.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// The first choice's message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&ChatMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// The first choice's text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(|m| m.content.as_deref())
    }

    /// The first choice's tool calls, empty when none were requested.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message()
            .and_then(|m| m.tool_calls.as_deref())
            .unwrap_or_default()
    }
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped ("stop", "tool_calls", "length").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage accounting.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_empty_optionals() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("tools").is_none());
        assert!(value.get("temperature").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_tool_result_round_trips_call_id() {
        let msg = ChatMessage::tool_result("call_42", r#"{"success":true}"#);
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_42");
    }

    #[test]
    fn test_completion_with_tool_calls_deserializes() {
        let body = json!({
            "id": "chatcmpl-1",
            "model": "test-model",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "view_cart",
                            "arguments": "{}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });

        let completion: ChatCompletion =
            serde_json::from_value(body).expect("deserialize");
        assert!(completion.text().is_none());
        let calls = completion.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls.first().map(|c| c.function.name.as_str()), Some("view_cart"));
    }

    #[test]
    fn test_text_completion_deserializes() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }]
        });
        let completion: ChatCompletion =
            serde_json::from_value(body).expect("deserialize");
        assert_eq!(completion.text(), Some("Hello!"));
        assert!(completion.tool_calls().is_empty());
    }
}
