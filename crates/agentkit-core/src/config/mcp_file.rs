//! Loader for standalone MCP server documents
//!
//! Accepts either `{"mcpServers": {...}}` or a bare `{name: descriptor}` object.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::error::{ConfigError, ConfigResult};

const SERVERS_KEY: &str = "mcpServers";

/// Read the raw server descriptor mapping from a JSON file
pub fn load_mcp_servers(path: impl AsRef<Path>) -> ConfigResult<Map<String, Value>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    parse_mcp_servers(&content)
}

/// Parse the raw server descriptor mapping from JSON text
pub fn parse_mcp_servers(content: &str) -> ConfigResult<Map<String, Value>> {
    let document: Value = serde_json::from_str(content)?;
    let Value::Object(mut root) = document else {
        return Err(ConfigError::Invalid("MCP document must be a JSON object".to_string()));
    };

    match root.remove(SERVERS_KEY) {
        Some(Value::Object(servers)) => Ok(servers),
        Some(_) => Err(ConfigError::Invalid(format!("`{}` must be an object", SERVERS_KEY))),
        None => Ok(root),
    }
}
