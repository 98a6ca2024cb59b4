//! MCP (Model Context Protocol) tool discovery
//!
//! Uses the official rmcp SDK to connect to MCP servers over stdio child
//! processes or HTTP, and publishes their tools into a [`ToolRegistry`].
//!
//! ```text
//!  mcpServers JSON ──▶ validate_descriptors ──▶ ToolDiscovery (batch, timeout)
//!                                                      │
//!                         block_on_isolated ◀──────────┘
//!                                │
//!                                ▼
//!                   ToolRegistry ("mcp" category)
//! ```
//!
//! [`ToolRegistry`]: crate::tools::ToolRegistry

mod bootstrap;
pub mod bridge;
mod client;
mod descriptor;
mod discovery;
pub mod mock;
mod tool;

pub use bootstrap::{
    BootstrapOptions, ClientInfo, DiscoveryOutcome, DiscoveryResult, McpToolBootstrap,
    DEFAULT_DISCOVERY_TIMEOUT, MCP_CATEGORY,
};
pub use bridge::{block_on_isolated, BridgeError, BridgeStrategy};
pub use client::{result_text, McpClient, McpError, McpResult};
pub use descriptor::{
    validate_descriptors, LaunchCommand, ServerDescriptor, TransportKind, ValidatedServers,
};
pub use discovery::{McpDiscovery, ToolDiscovery};
pub use mock::{MockBehaviour, MockDiscovery};
pub use tool::McpToolHandle;

// Re-export rmcp types that consumers might need
pub use rmcp::model::{CallToolResult as McpToolResult, Tool as McpTool};
