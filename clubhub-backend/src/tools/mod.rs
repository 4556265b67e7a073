pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::ToolRegistry;
pub use types::{ToolContext, ToolDefinition};
