//! MCP Client using the official rmcp SDK
//!
//! Connects to MCP servers over a child process (stdio) or HTTP.

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    transport::{StreamableHttpClientTransport, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;

use super::descriptor::{ServerDescriptor, TransportKind};
use crate::logging::Logger;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection to '{server}' failed: {message}")]
    ConnectionFailed { server: String, message: String },

    #[error("Initialization of '{server}' failed: {message}")]
    InitializationFailed { server: String, message: String },

    #[error("Server '{server}' uses unsupported transport '{transport}'")]
    UnsupportedTransport { server: String, transport: String },

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "agentkit-core".to_string(),
            title: Some("AgentKit Core".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// A live session with one MCP server
pub struct McpClient {
    server: String,
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect to the server a descriptor points at
    pub async fn connect(descriptor: &ServerDescriptor, logger: Arc<dyn Logger>) -> McpResult<Self> {
        match &descriptor.transport {
            TransportKind::Stdio => Self::connect_stdio(descriptor, logger).await,
            TransportKind::Sse | TransportKind::Http => {
                Self::connect_http(&descriptor.name, &descriptor.launch.as_line(), logger).await
            }
            TransportKind::Other(transport) => Err(McpError::UnsupportedTransport {
                server: descriptor.name.clone(),
                transport: transport.clone(),
            }),
        }
    }

    /// Spawn the server as a child process and speak MCP over its stdio
    pub async fn connect_stdio(
        descriptor: &ServerDescriptor,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let (program, mut args) = descriptor.launch.program_and_args();
        args.extend(descriptor.extra_args());

        logger.info(&format!(
            "[McpClient] Launching '{}': {} {}",
            descriptor.name,
            program,
            args.join(" ")
        ));

        let mut command = tokio::process::Command::new(&program);
        command.args(&args).envs(descriptor.env());
        if let Some(dir) = descriptor.cwd() {
            command.current_dir(dir);
        }

        let transport = TokioChildProcess::new(command).map_err(|e| McpError::ConnectionFailed {
            server: descriptor.name.clone(),
            message: e.to_string(),
        })?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed {
                server: descriptor.name.clone(),
                message: e.to_string(),
            })?;

        logger.info(&format!("[McpClient] Connected to '{}'", descriptor.name));

        Ok(Self {
            server: descriptor.name.clone(),
            client,
            logger,
        })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(server: &str, url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to '{}' at {}", server, url));

        let transport = StreamableHttpClientTransport::from_uri(url.to_string());

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed {
                server: server.to_string(),
                message: e.to_string(),
            })?;

        logger.info(&format!("[McpClient] Connected to '{}'", server));

        Ok(Self {
            server: server.to_string(),
            client,
            logger,
        })
    }

    pub fn server_name(&self) -> &str {
        &self.server
    }

    /// List every tool the server advertises, following pagination
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let tools = self
            .client
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] '{}' listed {} tools",
            self.server,
            tools.len()
        ));

        Ok(tools)
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.debug(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger
            .debug(&format!("[McpClient] Closing connection to '{}'", self.server));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

/// Join the text blocks of a tool result
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    #[tokio::test]
    async fn test_unsupported_transport_is_rejected_before_connecting() {
        let descriptor = ServerDescriptor::from_value(
            "ws",
            &json!({"command": "ws://localhost:9000", "transport": "websocket"}),
        )
        .unwrap();

        let err = McpClient::connect(&descriptor, Arc::new(NoOpLogger))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, McpError::UnsupportedTransport { .. }));
        assert!(err.to_string().contains("websocket"));
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_connect() {
        let descriptor = ServerDescriptor::from_value(
            "ghost",
            &json!({"command": "/nonexistent/agentkit-mcp-server", "transport": "stdio"}),
        )
        .unwrap();

        let result = McpClient::connect(&descriptor, Arc::new(NoOpLogger)).await;
        assert!(result.is_err());
    }
}
