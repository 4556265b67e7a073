//! Scripted AI client for tests: returns queued responses in order and
//! records every request it receives.

use crate::ai::types::{AiError, AiResponse, ToolHistoryEntry};
use crate::ai::Message;
use crate::tools::ToolDefinition;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One request seen by the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    pub messages: Vec<Message>,
    pub tool_history: Vec<ToolHistoryEntry>,
    pub tool_names: Vec<String>,
}

pub struct MockAiClient {
    responses: Mutex<VecDeque<Result<AiResponse, AiError>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockAiClient {
    pub fn new(responses: Vec<Result<AiResponse, AiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that answers every call in order with the given texts
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(AiResponse::text(t.to_string())))
                .collect(),
        )
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, AiError> {
        self.next(messages, Vec::new(), Vec::new())
            .map(|response| response.content)
    }

    pub async fn generate_with_tools(
        &self,
        messages: Vec<Message>,
        tool_history: Vec<ToolHistoryEntry>,
        tools: Vec<ToolDefinition>,
    ) -> Result<AiResponse, AiError> {
        self.next(messages, tool_history, tools)
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }

    fn next(
        &self,
        messages: Vec<Message>,
        tool_history: Vec<ToolHistoryEntry>,
        tools: Vec<ToolDefinition>,
    ) -> Result<AiResponse, AiError> {
        self.calls.lock().push(MockCall {
            messages,
            tool_history,
            tool_names: tools.into_iter().map(|t| t.name).collect(),
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::new("Mock AI client has no queued responses")))
    }
}
