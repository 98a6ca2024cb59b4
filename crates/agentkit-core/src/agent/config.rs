//! Agent configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AgentError;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Declarative description of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Tool names to expose; empty means every tool in the registry
    #[serde(default)]
    pub tools: Vec<String>,
    /// Free-form provider options carried alongside the agent
    #[serde(default)]
    pub llm_config: Map<String, Value>,
    /// Maximum number of model round trips per message
    ///
    /// Default: 10
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl AgentConfig {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
            llm_config: Map::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AgentError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("name cannot be empty".to_string());
        }
        if self.max_iterations == 0 {
            errors.push("max_iterations must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push("temperature must be between 0.0 and 2.0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgentError::InvalidConfig(errors.join("; ")))
        }
    }
}

/// One member of a multi-agent team; unset fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl TeamMemberConfig {
    /// Resolve into a full config for the member keyed by `agent_id`
    pub fn into_agent_config(self, agent_id: &str) -> AgentConfig {
        AgentConfig {
            name: self.name.unwrap_or_else(|| agent_id.to_string()),
            description: self
                .description
                .unwrap_or_else(|| format!("Agent {}", agent_id)),
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            tools: self.tools,
            llm_config: Map::new(),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }
    }
}
