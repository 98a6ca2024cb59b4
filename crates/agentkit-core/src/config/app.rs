//! Application configuration model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which model to talk to and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Provider name (ollama, openai, anthropic, google, ...)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier as used by the provider's API
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "llama3:latest".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::new(default_provider(), default_model())
    }
}

impl ModelSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Raw MCP server descriptors keyed by server name
///
/// Kept untyped on purpose: entries are validated by the MCP bootstrap,
/// which drops malformed ones instead of failing the whole load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct McpSettings {
    pub servers: Map<String, Value>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level name (DEBUG, INFO, WARNING, ERROR)
    #[serde(default = "default_level")]
    pub level: String,
    /// Optional file that mirrors console output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

fn default_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_path: None,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpSettings>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub debug: bool,
    /// Upper bound, in seconds, for a single agent turn
    #[serde(default = "default_max_execution_time")]
    pub max_execution_time: u64,
}

fn default_max_execution_time() -> u64 {
    300
}

/// Used when no configuration file can be found
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::new("ollama", "qwen3:0.6b"),
            mcp: None,
            logging: LoggingConfig::default(),
            debug: false,
            max_execution_time: default_max_execution_time(),
        }
    }
}

impl AppConfig {
    /// Top-level keys accepted by partial updates
    pub const KEYS: [&'static str; 5] = ["model", "mcp", "logging", "debug", "max_execution_time"];

    /// MCP server descriptors, empty when no `mcp` section is present
    pub fn mcp_servers(&self) -> Map<String, Value> {
        self.mcp
            .as_ref()
            .map(|m| m.servers.clone())
            .unwrap_or_default()
    }
}
