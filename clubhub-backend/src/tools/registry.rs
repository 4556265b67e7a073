use crate::tools::types::{ToolContext, ToolDefinition, ToolResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition for the AI API
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the given parameters
    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult;

    /// Returns the tool's name
    fn name(&self) -> String {
        self.definition().name
    }
}

/// Registry that holds all available tools.
/// Uses interior mutability (RwLock) so tools can be registered without `&mut self`.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with every built-in tool registered
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(crate::tools::builtin::DatabaseTool::new()));
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        self.tools.write().insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Definitions for the named tools, in the given order; unknown names are skipped
    pub fn definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        let tools = self.tools.read();
        names
            .iter()
            .filter_map(|name| tools.get(*name).map(|t| t.definition()))
            .collect()
    }

    /// Execute a tool by name. An unknown tool yields an error result for the model.
    pub async fn execute(&self, name: &str, params: Value, context: &ToolContext) -> ToolResult {
        match self.get(name) {
            Some(tool) => tool.execute(params, context).await,
            None => {
                log::warn!("Model requested unknown tool '{}'", name);
                ToolResult::error(format!("Unknown tool: {}", name))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
