//! Tool-calling agent loop

use std::sync::Arc;

use serde_json::Value;

use crate::logging::Logger;
use crate::providers::ModelClient;
use crate::tools::{SharedTool, ToolRegistry};
use crate::types::{ChatMessage, Tool, ToolCall, ToolResult};

use super::config::AgentConfig;
use super::error::{AgentError, AgentResult};
use super::state::{AgentMessage, AgentState};

/// An agent that alternates model turns with tool calls
///
/// Each message runs at most `max_iterations` model round trips. A round
/// trip that requests tools executes them against the agent's own tool set
/// and feeds the results back; the first reply without tool calls is the
/// answer.
pub struct ReactAgent {
    config: AgentConfig,
    model: ModelClient,
    registry: Option<Arc<ToolRegistry>>,
    logger: Arc<dyn Logger>,
    state: AgentState,
    tools: Option<Vec<SharedTool>>,
}

impl ReactAgent {
    pub fn new(
        config: AgentConfig,
        model: ModelClient,
        registry: Option<Arc<ToolRegistry>>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let model = model.with_temperature(config.temperature);
        Self {
            config,
            model,
            registry,
            logger,
            state: AgentState::default(),
            tools: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.tools.is_some()
    }

    /// Resolve the tool set from the registry
    ///
    /// An empty tool list selects every registered tool; named tools that
    /// the registry does not hold are skipped with a warning.
    pub fn initialize(&mut self) {
        let tools = self.resolve_tools();
        self.logger.info(&format!(
            "[ReactAgent] Initialized '{}' with {} tools",
            self.config.name,
            tools.len()
        ));
        self.tools = Some(tools);
    }

    fn resolve_tools(&self) -> Vec<SharedTool> {
        let Some(registry) = &self.registry else {
            return Vec::new();
        };

        if self.config.tools.is_empty() {
            return registry.get_all_tools();
        }

        self.config
            .tools
            .iter()
            .filter_map(|name| {
                let tool = registry.get_tool(name);
                if tool.is_none() {
                    self.logger.warn(&format!(
                        "[ReactAgent] '{}' requested unknown tool: {}",
                        self.config.name, name
                    ));
                }
                tool
            })
            .collect()
    }

    /// Tools this agent offers to the model
    pub fn available_tools(&self) -> Vec<SharedTool> {
        match &self.tools {
            Some(tools) => tools.clone(),
            None => self.resolve_tools(),
        }
    }

    pub fn available_tool_names(&self) -> Vec<String> {
        self.available_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Handle one user message and return the final answer
    ///
    /// Failures are logged and returned as text.
    pub async fn process_message(&mut self, message: &str) -> String {
        if !self.is_initialized() {
            self.initialize();
        }

        self.state.push(AgentMessage::user(message));

        match self.run_loop().await {
            Ok(answer) => answer,
            Err(e) => {
                self.logger.error(&format!(
                    "[ReactAgent] '{}' failed to process message: {}",
                    self.config.name, e
                ));
                format!("Error processing message: {}", e)
            }
        }
    }

    async fn run_loop(&mut self) -> AgentResult<String> {
        let tools = self.tools.clone().unwrap_or_default();
        let definitions: Vec<Tool> = tools.iter().map(|t| t.definition()).collect();

        for iteration in 1..=self.config.max_iterations {
            self.state.current_step = Some(format!("iteration {}", iteration));

            let response = self.model.chat(self.prompt(), &definitions).await?;

            if !response.has_tool_calls() {
                self.state.current_step = None;
                self.state.push(AgentMessage::assistant(&response.content));
                return Ok(response.content);
            }

            self.logger.debug(&format!(
                "[ReactAgent] Iteration {}: {} tool call(s)",
                iteration,
                response.tool_calls.len()
            ));

            self.state.push(AgentMessage::tool_request(
                &response.content,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = self.execute(&tools, call).await;
                self.state
                    .tool_results
                    .insert(result.call_id.clone(), Value::String(result.content.clone()));
                self.state.push(AgentMessage::tool(result.call_id, result.content));
            }
        }

        self.state.current_step = None;
        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    async fn execute(&self, tools: &[SharedTool], call: &ToolCall) -> ToolResult {
        let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
            self.logger.warn(&format!(
                "[ReactAgent] Model requested unavailable tool: {}",
                call.name
            ));
            return ToolResult::error(&call.id, format!("Error: tool '{}' is not available", call.name));
        };

        match tool.invoke(call.input.clone()).await {
            Ok(content) => ToolResult::success(&call.id, content),
            Err(e) => {
                self.logger
                    .error(&format!("[ReactAgent] Tool call failed: {}", e));
                ToolResult::error(&call.id, format!("Error: {}", e))
            }
        }
    }

    fn prompt(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.state.messages.len() + 1);
        if !self.config.system_prompt.is_empty() {
            messages.push(ChatMessage::system(&self.config.system_prompt));
        }
        messages.extend(self.state.messages.iter().flat_map(AgentMessage::to_chat_messages));
        messages
    }

    /// The last `limit` messages, or the whole history
    pub fn conversation_history(&self, limit: Option<usize>) -> &[AgentMessage] {
        self.state.history(limit)
    }

    /// Forget the conversation; the resolved tool set is kept
    pub fn reset_state(&mut self) {
        self.state = AgentState::default();
    }
}

impl std::fmt::Debug for ReactAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactAgent")
            .field("name", &self.config.name)
            .field("model", &self.model)
            .field("messages", &self.state.messages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::providers::{ChatResponse, MockProvider, ProviderModelConfig};
    use crate::tools::FunctionTool;
    use crate::types::MessageRole;
    use serde_json::json;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    fn client(provider: MockProvider) -> (ModelClient, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let model = ModelClient::new(provider.clone(), ProviderModelConfig::new("mock"), logger());
        (model, provider)
    }

    fn adder() -> SharedTool {
        FunctionTool::new("add", "Add two numbers", |args| async move {
            let a = args["a"].as_i64().unwrap_or(0);
            let b = args["b"].as_i64().unwrap_or(0);
            Ok((a + b).to_string())
        })
        .shared()
    }

    fn registry_with(tools: &[SharedTool]) -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::new(logger()));
        registry.register_tools(tools, "math");
        registry
    }

    fn reply(content: &str) -> ChatResponse {
        ChatResponse {
            content: content.to_string(),
            tool_calls: Vec::new(),
        }
    }

    fn call(id: &str, name: &str, input: Value) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall::new(id, name, input)],
        }
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let (model, provider) = client(MockProvider::fixed("hello there", logger()));
        let config = AgentConfig::new("greeter", "Says hi", "Be brief.");
        let mut agent = ReactAgent::new(config, model, None, logger());

        assert_eq!(agent.process_message("hi").await, "hello there");
        assert_eq!(provider.calls(), 1);

        let sent = provider.last_messages();
        assert_eq!(sent[0].role, MessageRole::System);
        assert_eq!(sent[0].flatten_text(), "Be brief.");

        let history = agent.conversation_history(None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let (model, provider) = client(MockProvider::scripted(
            vec![call("c1", "add", json!({"a": 2, "b": 3})), reply("The sum is 5")],
            logger(),
        ));
        let config = AgentConfig::new("calc", "Adds", "Use tools.");
        let mut agent = ReactAgent::new(config, model, Some(registry_with(&[adder()])), logger());

        assert_eq!(agent.process_message("2+3?").await, "The sum is 5");
        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.last_tool_names(), vec!["add"]);
        assert_eq!(agent.state().tool_results["c1"], json!("5"));

        let roles: Vec<_> = agent.conversation_history(None).iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::Tool, MessageRole::Assistant]
        );
    }

    #[tokio::test]
    async fn test_max_iterations_returns_error_text() {
        let (model, provider) = client(MockProvider::scripted(
            vec![call("c", "add", json!({"a": 1, "b": 1}))],
            logger(),
        ));
        let config = AgentConfig::new("looper", "", "").with_max_iterations(3);
        let mut agent = ReactAgent::new(config, model, Some(registry_with(&[adder()])), logger());

        let answer = agent.process_message("go").await;
        assert!(answer.contains("max iterations (3)"));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_returns_text() {
        let memory = Arc::new(MemoryLogger::new());
        let (model, _) = client(MockProvider::error("boom", logger()));
        let mut agent = ReactAgent::new(AgentConfig::new("a", "", ""), model, None, memory.clone());

        let answer = agent.process_message("hi").await;
        assert!(answer.starts_with("Error processing message:"));
        assert!(memory.contains(LogLevel::Error, "boom"));
    }

    #[tokio::test]
    async fn test_unavailable_tool_is_reported_to_model() {
        let (model, _) = client(MockProvider::scripted(
            vec![call("c1", "delete_everything", json!({})), reply("ok")],
            logger(),
        ));
        let config = AgentConfig::new("calc", "", "").with_tools(["add"]);
        let mut agent = ReactAgent::new(config, model, Some(registry_with(&[adder()])), logger());

        assert_eq!(agent.process_message("x").await, "ok");
        let outcome = agent.state().tool_results["c1"].as_str().unwrap().to_string();
        assert!(outcome.contains("not available"));
    }

    #[test]
    fn test_tool_selection() {
        let echo = FunctionTool::new("echo", "", |args| async move { Ok(args.to_string()) }).shared();
        let registry = registry_with(&[adder(), echo]);
        let memory = Arc::new(MemoryLogger::new());

        let (model, _) = client(MockProvider::echo(logger()));
        let all = ReactAgent::new(AgentConfig::new("a", "", ""), model.clone(), Some(registry.clone()), logger());
        assert_eq!(all.available_tool_names(), vec!["add", "echo"]);

        let mut named = ReactAgent::new(
            AgentConfig::new("b", "", "").with_tools(["echo", "missing"]),
            model.clone(),
            Some(registry),
            memory.clone(),
        );
        named.initialize();
        assert_eq!(named.available_tool_names(), vec!["echo"]);
        assert!(memory.contains(LogLevel::Warn, "missing"));

        let bare = ReactAgent::new(AgentConfig::new("c", "", ""), model, None, logger());
        assert!(bare.available_tools().is_empty());
    }

    #[tokio::test]
    async fn test_reset_state_keeps_tools() {
        let (model, _) = client(MockProvider::echo(logger()));
        let mut agent = ReactAgent::new(AgentConfig::new("e", "", ""), model, Some(registry_with(&[adder()])), logger());

        assert_eq!(agent.process_message("one").await, "Echo: one");
        agent.process_message("two").await;
        assert_eq!(agent.conversation_history(Some(1))[0].content, "Echo: two");

        agent.reset_state();
        assert!(agent.conversation_history(None).is_empty());
        assert!(agent.is_initialized());
    }

    #[test]
    fn test_temperature_applied_to_model() {
        let (model, _) = client(MockProvider::echo(logger()));
        let agent = ReactAgent::new(AgentConfig::new("t", "", "").with_temperature(0.2), model, None, logger());
        assert_eq!(agent.model.temperature(), Some(0.2));
    }
}
