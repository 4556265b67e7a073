mod database;

pub use database::{DatabaseTool, DATABASE_TOOL_NAME};
