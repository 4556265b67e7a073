pub mod mock;
pub mod openai;
pub mod types;

pub use mock::MockAiClient;
pub use openai::OpenAIClient;
pub use types::{AiError, AiResponse, ToolHistoryEntry, ToolResponse};

use crate::config::Config;
use crate::tools::ToolDefinition;
use serde::{Deserialize, Serialize};
use strum::Display;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// Unified AI client over the configured provider
pub enum AiClient {
    OpenAI(OpenAIClient),
    Mock(MockAiClient),
}

impl AiClient {
    /// Create the OpenAI-compatible client from configuration
    pub fn from_config(config: &Config) -> Result<Self, String> {
        if config.openai_api_key.is_empty() {
            log::warn!("OPENAI_API_KEY is not set; agent requests will likely be rejected by the provider");
        }
        let client = OpenAIClient::new(
            &config.openai_api_key,
            &config.openai_api_base,
            &config.openai_model,
        )?
        .with_retry_delay(Duration::from_millis(config.openai_retry_base_ms));
        Ok(AiClient::OpenAI(client))
    }

    pub fn model_name(&self) -> &str {
        match self {
            AiClient::OpenAI(client) => client.model(),
            AiClient::Mock(_) => "mock",
        }
    }

    /// Generate text using the configured provider
    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, AiError> {
        match self {
            AiClient::OpenAI(client) => client.generate_text(messages).await,
            AiClient::Mock(client) => client.generate_text(messages).await,
        }
    }

    /// Generate a response with tool support
    pub async fn generate_with_tools(
        &self,
        messages: Vec<Message>,
        tool_history: Vec<ToolHistoryEntry>,
        tools: Vec<ToolDefinition>,
    ) -> Result<AiResponse, AiError> {
        match self {
            AiClient::OpenAI(client) => {
                let tool_messages = tool_history
                    .iter()
                    .flat_map(|entry| {
                        OpenAIClient::build_tool_result_messages(&entry.tool_calls, &entry.tool_responses)
                    })
                    .collect();
                client.generate_with_tools(messages, tool_messages, tools).await
            }
            AiClient::Mock(client) => client.generate_with_tools(messages, tool_history, tools).await,
        }
    }
}
