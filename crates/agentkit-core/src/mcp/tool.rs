//! Tool handles backed by MCP servers

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::client::{result_text, McpClient};
use super::descriptor::ServerDescriptor;
use crate::logging::Logger;
use crate::tools::{ToolError, ToolHandle};

/// A tool advertised by an MCP server
///
/// Discovery sessions are closed once the tool list is fetched, so each
/// invocation opens its own session on the caller's runtime.
pub struct McpToolHandle {
    name: String,
    description: String,
    schema: Value,
    server: ServerDescriptor,
    logger: Arc<dyn Logger>,
}

impl McpToolHandle {
    pub fn from_mcp(tool: &rmcp::model::Tool, server: &ServerDescriptor, logger: Arc<dyn Logger>) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool
                .description
                .as_deref()
                .unwrap_or_default()
                .to_string(),
            schema: Value::Object(tool.input_schema.as_ref().clone()),
            server: server.clone(),
            logger,
        }
    }

    /// Name of the server that advertised this tool
    pub fn server_name(&self) -> &str {
        &self.server.name
    }
}

impl std::fmt::Debug for McpToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolHandle")
            .field("name", &self.name)
            .field("server", &self.server.name)
            .finish()
    }
}

#[async_trait]
impl ToolHandle for McpToolHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let client = McpClient::connect(&self.server, Arc::clone(&self.logger))
            .await
            .map_err(|e| ToolError::execution(&self.name, e.to_string()))?;

        let outcome = client.call_tool(&self.name, arguments).await;
        if let Err(e) = client.close().await {
            self.logger.debug(&format!(
                "[McpToolHandle] Closing session for '{}' failed: {}",
                self.name, e
            ));
        }

        let result = outcome.map_err(|e| ToolError::execution(&self.name, e.to_string()))?;
        let text = result_text(&result);
        if result.is_error.unwrap_or(false) {
            return Err(ToolError::execution(&self.name, text));
        }
        Ok(text)
    }
}
