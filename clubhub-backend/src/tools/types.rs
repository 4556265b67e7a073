use crate::db::Database;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// JSON-schema fragment describing one tool parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl PropertySchema {
    pub fn new(schema_type: &str, description: &str) -> Self {
        PropertySchema {
            schema_type: schema_type.to_string(),
            description: description.to_string(),
            enum_values: None,
        }
    }

    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    pub required: Vec<String>,
}

/// Tool definition sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

/// Outcome of a tool execution, reported back to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: String,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult {
            success: true,
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolResult {
            success: false,
            content: message.into(),
        }
    }

    /// Serialize `value` as pretty JSON into a successful result
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::error(format!("Failed to serialize result: {}", e)),
        }
    }
}

/// Resources a tool may use while executing
#[derive(Clone)]
pub struct ToolContext {
    pub db: Arc<Database>,
}

impl ToolContext {
    pub fn new(db: Arc<Database>) -> Self {
        ToolContext { db }
    }
}
