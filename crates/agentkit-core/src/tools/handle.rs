//! Tool handle abstraction

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::Tool;

/// Errors raised while invoking a tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool {tool} failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// A named, invocable capability with a declared argument schema
///
/// Handles are owned by whoever produced them (an MCP server, local code);
/// the registry only indexes them by name.
#[async_trait]
pub trait ToolHandle: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema describing the accepted arguments
    fn parameter_schema(&self) -> &Value;

    /// Run the tool and return its textual output
    async fn invoke(&self, arguments: Value) -> Result<String, ToolError>;

    /// Definition advertised to models
    fn definition(&self) -> Tool {
        Tool::new(self.name(), self.description()).with_schema(self.parameter_schema().clone())
    }
}

/// Shared, reference-counted tool handle
pub type SharedTool = Arc<dyn ToolHandle>;
