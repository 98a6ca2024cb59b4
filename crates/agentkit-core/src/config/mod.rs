//! Configuration
//!
//! - [`AppConfig`]: model, MCP servers, logging and runtime limits
//! - [`ConfigManager`]: YAML/JSON file discovery, caching, updates
//! - [`load_mcp_servers`]: standalone `mcpServers` documents
//! - [`load_env`]: `.env` credentials

mod app;
mod env;
mod error;
mod manager;
mod mcp_file;

pub use app::{AppConfig, LoggingConfig, McpSettings, ModelSettings};
pub use env::load_env;
pub use error::{ConfigError, ConfigResult};
pub use manager::{ConfigFormat, ConfigManager};
pub use mcp_file::{load_mcp_servers, parse_mcp_servers};
