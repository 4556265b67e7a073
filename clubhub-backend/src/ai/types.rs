use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// AI API error with status code information
#[derive(Debug, Clone)]
pub struct AiError {
    /// Error message
    pub message: String,
    /// HTTP status code if available
    pub status_code: Option<u16>,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        AiError {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        AiError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "[HTTP {}] {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for AiError {}

impl From<String> for AiError {
    fn from(s: String) -> Self {
        AiError::new(s)
    }
}

impl From<&str> for AiError {
    fn from(s: &str) -> Self {
        AiError::new(s)
    }
}

/// Represents a tool call made by the AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool as JSON
    pub arguments: Value,
}

/// Represents the result of a tool execution to send back to the AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// ID of the tool call this responds to
    pub tool_call_id: String,
    /// Content of the tool response
    pub content: String,
    /// Whether the tool execution resulted in an error
    pub is_error: bool,
}

impl ToolResponse {
    pub fn success(tool_call_id: String, content: String) -> Self {
        ToolResponse {
            tool_call_id,
            content,
            is_error: false,
        }
    }

    pub fn error(tool_call_id: String, error: String) -> Self {
        ToolResponse {
            tool_call_id,
            content: error,
            is_error: true,
        }
    }
}

/// Provider-agnostic tool history entry.
/// Stores one round of tool calls and their responses for continuing a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolHistoryEntry {
    /// The tool calls made by the AI
    pub tool_calls: Vec<ToolCall>,
    /// The responses from executing those tool calls
    pub tool_responses: Vec<ToolResponse>,
}

impl ToolHistoryEntry {
    pub fn new(tool_calls: Vec<ToolCall>, tool_responses: Vec<ToolResponse>) -> Self {
        ToolHistoryEntry {
            tool_calls,
            tool_responses,
        }
    }
}

/// Unified AI response that can contain both text and tool calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    /// Text content of the response (may be empty if only tool calls)
    pub content: String,
    /// Tool calls requested by the AI
    pub tool_calls: Vec<ToolCall>,
    /// The reason the AI stopped generating
    pub stop_reason: Option<String>,
}

impl AiResponse {
    pub fn text(content: String) -> Self {
        AiResponse {
            content,
            tool_calls: vec![],
            stop_reason: Some("end_turn".to_string()),
        }
    }

    pub fn with_tools(content: String, tool_calls: Vec<ToolCall>) -> Self {
        AiResponse {
            content,
            tool_calls,
            stop_reason: Some("tool_use".to_string()),
        }
    }

    /// Check if the response contains tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
