//! AgentKit Core
//!
//! Building blocks for tool-using LLM agents:
//!
//! - [`providers`]: model clients over the `genai` crate, plus a mock
//! - [`tools`]: the shared [`ToolRegistry`] and the [`ToolHandle`] trait
//! - [`mcp`]: discovery of tools served by MCP servers
//! - [`agent`]: the tool-calling agent loop and a factory for agents and teams
//! - [`config`], [`logging`]: application settings and injected loggers
//!
//! ## MCP tool discovery
//!
//! [`McpToolBootstrap`] is constructed synchronously, from plain code or from
//! inside a running tokio runtime. It validates the server mapping, discovers
//! every server's tools in one batch bounded by a timeout, and registers them
//! under the `mcp` category. It never fails: problems are logged and show up
//! in the [`DiscoveryResult`].
//!
//! ```rust,ignore
//! use agentkit_core::{BootstrapOptions, McpToolBootstrap, ToolRegistry};
//!
//! let registry = Arc::new(ToolRegistry::new(logger.clone()));
//! let bootstrap = McpToolBootstrap::from_config(
//!     &app_config,
//!     BootstrapOptions::default()
//!         .with_registry(registry.clone())
//!         .with_logger(logger.clone()),
//! );
//!
//! if bootstrap.is_initialized() {
//!     println!("{} MCP tools", bootstrap.get_tools().len());
//! }
//! ```

pub mod agent;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall, ToolResult,
};

pub use logging::{ConsoleLogger, LogLevel, Logger, MemoryLogger, NoOpLogger, TracingLogger};

pub use config::{AppConfig, ConfigError, ConfigManager, ConfigResult, ModelSettings};

pub use tools::{FunctionTool, SharedTool, ToolError, ToolHandle, ToolInfo, ToolRegistry};

pub use mcp::{
    BootstrapOptions, DiscoveryOutcome, DiscoveryResult, McpClient, McpError, McpResult,
    McpToolBootstrap, ServerDescriptor,
};

pub use providers::{create_provider, ModelClient, Provider, ProviderError, ProviderResult};

pub use agent::{AgentConfig, AgentError, AgentFactory, ReactAgent};
