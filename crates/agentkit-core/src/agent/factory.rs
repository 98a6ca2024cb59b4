//! Agent construction from parameters

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::logging::Logger;
use crate::providers::ModelClient;
use crate::{log_debug, log_info, log_warn};
use crate::tools::ToolRegistry;

use super::config::{AgentConfig, TeamMemberConfig};
use super::react::ReactAgent;

/// Snapshot returned by [`AgentFactory::status`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryStatus {
    pub has_registry: bool,
    pub registered_tools: usize,
    pub capabilities: Vec<&'static str>,
}

/// Builds agents that share one tool registry
pub struct AgentFactory {
    registry: Option<Arc<ToolRegistry>>,
    logger: Arc<dyn Logger>,
}

impl AgentFactory {
    pub fn new(registry: Option<Arc<ToolRegistry>>, logger: Arc<dyn Logger>) -> Self {
        log_debug!(logger, "[AgentFactory] Created (registry: {})", registry.is_some());
        Self { registry, logger }
    }

    pub fn registry(&self) -> Option<&Arc<ToolRegistry>> {
        self.registry.as_ref()
    }

    /// Create an agent with default iteration and temperature limits
    ///
    /// `tools` restricts the agent to the named registry tools; an empty
    /// list selects all of them.
    pub fn create_agent(
        &self,
        name: &str,
        description: &str,
        system_prompt: &str,
        model: &ModelClient,
        tools: Vec<String>,
    ) -> ReactAgent {
        let config = AgentConfig::new(name, description, system_prompt).with_tools(tools);
        self.create_custom_agent(config, model)
    }

    pub fn create_custom_agent(&self, config: AgentConfig, model: &ModelClient) -> ReactAgent {
        if let Err(e) = config.validate() {
            log_warn!(self.logger, "[AgentFactory] Agent '{}': {}", config.name, e);
        }
        log_info!(self.logger, "[AgentFactory] Created agent: {}", config.name);
        ReactAgent::new(
            config,
            model.clone(),
            self.registry.clone(),
            Arc::clone(&self.logger),
        )
    }

    /// Create one agent per team member, keyed by member id
    pub fn create_multi_agent_team(
        &self,
        team: &BTreeMap<String, TeamMemberConfig>,
        model: &ModelClient,
    ) -> BTreeMap<String, ReactAgent> {
        let agents: BTreeMap<_, _> = team
            .iter()
            .map(|(id, member)| {
                let config = member.clone().into_agent_config(id);
                (id.clone(), self.create_custom_agent(config, model))
            })
            .collect();

        log_info!(self.logger, "[AgentFactory] Created team of {} agents", agents.len());
        agents
    }

    pub fn status(&self) -> FactoryStatus {
        FactoryStatus {
            has_registry: self.registry.is_some(),
            registered_tools: self.registry.as_ref().map_or(0, |r| r.tool_count()),
            capabilities: vec![
                "parameter-based agent creation",
                "custom agent configuration",
                "multi-agent teams",
                "tool registry integration",
            ],
        }
    }
}

impl std::fmt::Debug for AgentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFactory")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT};
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::providers::{MockProvider, ProviderModelConfig};
    use crate::tools::FunctionTool;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    fn model() -> ModelClient {
        ModelClient::new(
            Arc::new(MockProvider::echo(logger())),
            ProviderModelConfig::new("mock"),
            logger(),
        )
    }

    fn registry() -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::new(logger()));
        for name in ["search", "write"] {
            registry.register_tool(
                FunctionTool::new(name, "", |_| async { Ok(String::new()) }).shared(),
                "general",
            );
        }
        registry
    }

    #[tokio::test]
    async fn test_create_agent() {
        let factory = AgentFactory::new(Some(registry()), logger());
        let mut agent = factory.create_agent("helper", "Helps", "Be kind.", &model(), vec!["search".into()]);

        assert_eq!(agent.name(), "helper");
        assert_eq!(agent.config().max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(agent.available_tool_names(), vec!["search"]);
        assert_eq!(agent.process_message("ping").await, "Echo: ping");
    }

    #[test]
    fn test_team_defaults() {
        let factory = AgentFactory::new(Some(registry()), logger());
        let mut team = BTreeMap::new();
        team.insert("researcher".to_string(), TeamMemberConfig::default());
        team.insert(
            "writer".to_string(),
            TeamMemberConfig {
                name: Some("Writer".into()),
                tools: vec!["write".into()],
                max_iterations: Some(4),
                ..Default::default()
            },
        );

        let agents = factory.create_multi_agent_team(&team, &model());
        assert_eq!(agents.len(), 2);

        let researcher = &agents["researcher"];
        assert_eq!(researcher.name(), "researcher");
        assert_eq!(researcher.config().description, "Agent researcher");
        assert_eq!(researcher.config().system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(researcher.available_tool_names(), vec!["search", "write"]);

        let writer = &agents["writer"];
        assert_eq!(writer.name(), "Writer");
        assert_eq!(writer.config().max_iterations, 4);
        assert_eq!(writer.available_tool_names(), vec!["write"]);
    }

    #[test]
    fn test_invalid_config_is_warned_not_fatal() {
        let memory = Arc::new(MemoryLogger::new());
        let factory = AgentFactory::new(None, memory.clone());
        let agent = factory.create_custom_agent(AgentConfig::new("x", "", "").with_max_iterations(0), &model());

        assert_eq!(agent.name(), "x");
        assert!(memory.contains(LogLevel::Warn, "max_iterations"));
    }

    #[test]
    fn test_status() {
        let status = AgentFactory::new(Some(registry()), logger()).status();
        assert!(status.has_registry);
        assert_eq!(status.registered_tools, 2);

        let bare = AgentFactory::new(None, logger()).status();
        assert!(!bare.has_registry);
        assert_eq!(bare.registered_tools, 0);
    }
}
