//! Tool registry shared by the MCP bootstrap and the agent runtime
//!
//! The ToolRegistry is the central component for:
//! - Indexing tool handles by name (last registration wins)
//! - Grouping names into non-exclusive categories ("general", "mcp", ...)
//! - Converting tools to model-facing definitions
//! - Executing tool calls and returning results
//!
//! It is passed around as `Arc<ToolRegistry>`; all state sits behind one
//! lock so the name/category invariants hold for concurrent readers.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::handle::SharedTool;
use crate::logging::Logger;
use crate::types::{Tool, ToolCall, ToolResult};

/// Category used when the caller does not name one
pub const DEFAULT_CATEGORY: &str = "general";

/// Descriptive view of a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    /// JSON Schema for tool parameters
    pub input_schema: Value,
    /// Categories the tool is listed under
    pub categories: Vec<String>,
}

#[derive(Default)]
struct RegistryState {
    tools: BTreeMap<String, SharedTool>,
    categories: BTreeMap<String, Vec<String>>,
}

impl RegistryState {
    fn categories_of(&self, name: &str) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, names)| names.iter().any(|n| n == name))
            .map(|(category, _)| category.clone())
            .collect()
    }

    fn info(&self, name: &str) -> Option<ToolInfo> {
        self.tools.get(name).map(|tool| ToolInfo {
            name: name.to_string(),
            description: tool.description().to_string(),
            input_schema: tool.parameter_schema().clone(),
            categories: self.categories_of(name),
        })
    }

    fn purge(&mut self, name: &str) -> bool {
        if self.tools.remove(name).is_none() {
            return false;
        }
        for names in self.categories.values_mut() {
            names.retain(|n| n != name);
        }
        self.categories.retain(|_, names| !names.is_empty());
        true
    }
}

/// Whether two handles point at the same tool instance
pub(crate) fn same_handle(a: &SharedTool, b: &SharedTool) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Registry of available tools
pub struct ToolRegistry {
    state: RwLock<RegistryState>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            logger,
        }
    }

    /// Register a tool under `category`, replacing any tool with the same name
    ///
    /// A replacement by a different handle is logged as a warning; it is
    /// never an error. The replaced tool's categories are dropped, so the
    /// name ends up only in `category`.
    pub fn register_tool(&self, tool: SharedTool, category: &str) {
        let name = tool.name().to_string();

        let replaced_from = {
            let mut state = self.state.write();
            let replaced = match state.tools.get(&name) {
                Some(previous) if !same_handle(previous, &tool) => {
                    let categories = state.categories_of(&name);
                    state.purge(&name);
                    Some(categories)
                }
                _ => None,
            };
            state.tools.insert(name.clone(), Arc::clone(&tool));

            let names = state.categories.entry(category.to_string()).or_default();
            if !names.iter().any(|n| n == &name) {
                names.push(name.clone());
            }
            replaced
        };

        match replaced_from {
            Some(previous) => self.logger.warn(&format!(
                "[ToolRegistry] Tool name collision: '{}' (previously in [{}]) replaced by registration in '{}'; old categories dropped",
                name,
                previous.join(", "),
                category
            )),
            None => self.logger.debug(&format!(
                "[ToolRegistry] Registered tool: {} (category: {})",
                name, category
            )),
        }
    }

    /// Register several tools under the same category
    pub fn register_tools(&self, tools: &[SharedTool], category: &str) {
        for tool in tools {
            self.register_tool(Arc::clone(tool), category);
        }
        self.logger.info(&format!(
            "[ToolRegistry] Registered {} tools in category '{}'",
            tools.len(),
            category
        ));
    }

    pub fn get_tool(&self, name: &str) -> Option<SharedTool> {
        self.state.read().tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().tools.contains_key(name)
    }

    pub fn get_tools_by_category(&self, category: &str) -> Vec<SharedTool> {
        let state = self.state.read();
        state
            .categories
            .get(category)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| state.tools.get(n).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_all_tools(&self) -> Vec<SharedTool> {
        self.state.read().tools.values().cloned().collect()
    }

    /// Registered names in sorted order
    pub fn get_tool_names(&self) -> Vec<String> {
        self.state.read().tools.keys().cloned().collect()
    }

    pub fn get_categories(&self) -> Vec<String> {
        self.state.read().categories.keys().cloned().collect()
    }

    /// Remove a tool from the registry and from every category
    pub fn remove_tool(&self, name: &str) -> bool {
        let removed = self.state.write().purge(name);
        if removed {
            self.logger
                .info(&format!("[ToolRegistry] Removed tool: {}", name));
        }
        removed
    }

    /// Remove `tool` only if the registry still holds this exact handle
    pub fn remove_handle(&self, tool: &SharedTool) -> bool {
        let mut state = self.state.write();
        let held = state
            .tools
            .get(tool.name())
            .is_some_and(|current| same_handle(current, tool));
        held && state.purge(tool.name())
    }

    pub fn clear_tools(&self) {
        let mut state = self.state.write();
        state.tools.clear();
        state.categories.clear();
        drop(state);
        self.logger.info("[ToolRegistry] Cleared all tools");
    }

    pub fn get_tool_info(&self, name: &str) -> Option<ToolInfo> {
        self.state.read().info(name)
    }

    pub fn list_tools(&self) -> BTreeMap<String, ToolInfo> {
        let state = self.state.read();
        state
            .tools
            .keys()
            .filter_map(|name| state.info(name).map(|info| (name.clone(), info)))
            .collect()
    }

    /// Definitions for every registered tool, ready to send to a model
    pub fn get_llm_tools(&self) -> Vec<Tool> {
        self.state
            .read()
            .tools
            .values()
            .map(|tool| tool.definition())
            .collect()
    }

    pub fn tool_count(&self) -> usize {
        self.state.read().tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().tools.is_empty()
    }

    /// Execute a tool call from a model response
    pub async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        let Some(tool) = self.get_tool(&tool_call.name) else {
            self.logger.warn(&format!(
                "[ToolRegistry] Model requested unknown tool: {}",
                tool_call.name
            ));
            return ToolResult::error(
                &tool_call.id,
                format!("Error: tool '{}' is not available", tool_call.name),
            );
        };

        self.logger
            .info(&format!("[ToolRegistry] Calling tool: {}", tool_call.name));

        match tool.invoke(tool_call.input.clone()).await {
            Ok(content) => ToolResult::success(&tool_call.id, content),
            Err(e) => {
                self.logger
                    .error(&format!("[ToolRegistry] Tool call failed: {}", e));
                ToolResult::error(&tool_call.id, format!("Error: {}", e))
            }
        }
    }

    /// Execute several tool calls in order
    pub async fn execute_tool_calls(&self, tool_calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            results.push(self.execute_tool_call(call).await);
        }
        results
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ToolRegistry")
            .field("tools", &state.tools.keys().collect::<Vec<_>>())
            .field("categories", &state.categories)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::tools::{FunctionTool, ToolError};
    use serde_json::json;

    fn tool(name: &str, output: &'static str) -> SharedTool {
        FunctionTool::new(name, format!("{} tool", name), move |_| async move {
            Ok(output.to_string())
        })
        .shared()
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(NoOpLogger))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        registry.register_tool(tool("search", "s"), DEFAULT_CATEGORY);
        registry.register_tools(&[tool("read", "r"), tool("write", "w")], "fs");

        assert_eq!(registry.tool_count(), 3);
        assert!(registry.get_tool("search").is_some());
        assert!(registry.get_tool("missing").is_none());
        assert_eq!(registry.get_tool_names(), vec!["read", "search", "write"]);
        assert_eq!(registry.get_categories(), vec!["fs", "general"]);
        assert_eq!(registry.get_tools_by_category("fs").len(), 2);
        assert!(registry.get_tools_by_category("nope").is_empty());
    }

    #[test]
    fn test_name_collision_is_last_write_wins_with_warning() {
        let logger = Arc::new(MemoryLogger::new());
        let registry = ToolRegistry::new(logger.clone());

        registry.register_tool(tool("lookup", "first"), "mcp");
        let second = tool("lookup", "second");
        registry.register_tool(Arc::clone(&second), "mcp");

        assert_eq!(registry.tool_count(), 1);
        assert_eq!(registry.get_tools_by_category("mcp").len(), 1);
        assert!(same_handle(&registry.get_tool("lookup").unwrap(), &second));
        assert!(logger.contains(LogLevel::Warn, "'lookup'"));
    }

    #[test]
    fn test_replacement_moves_name_out_of_old_category() {
        let registry = registry();
        registry.register_tool(tool("fetch", "remote"), "mcp");
        registry.register_tool(tool("other", "o"), "mcp");
        let local = tool("fetch", "local");
        registry.register_tool(Arc::clone(&local), DEFAULT_CATEGORY);

        let mcp: Vec<_> = registry.get_tools_by_category("mcp").iter().map(|t| t.name().to_string()).collect();
        assert_eq!(mcp, vec!["other"]);
        assert_eq!(registry.get_tool_info("fetch").unwrap().categories, vec![DEFAULT_CATEGORY]);
        assert!(same_handle(&registry.get_tools_by_category(DEFAULT_CATEGORY)[0], &local));

        registry.register_tool(tool("solo", "1"), "only");
        registry.register_tool(tool("solo", "2"), DEFAULT_CATEGORY);
        assert!(!registry.get_categories().contains(&"only".to_string()));
    }

    #[test]
    fn test_reregistering_same_handle_is_silent() {
        let logger = Arc::new(MemoryLogger::new());
        let registry = ToolRegistry::new(logger.clone());
        let handle = tool("echo", "e");

        registry.register_tool(Arc::clone(&handle), "a");
        registry.register_tool(Arc::clone(&handle), "b");

        assert!(logger.messages(LogLevel::Warn).is_empty());
        assert_eq!(registry.get_tool_info("echo").unwrap().categories, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_purges_categories() {
        let registry = registry();
        registry.register_tool(tool("a", ""), "x");
        registry.register_tool(tool("b", ""), "x");
        registry.register_tool(tool("a", ""), "y");

        assert!(registry.remove_tool("a"));
        assert!(!registry.remove_tool("a"));
        assert_eq!(registry.get_categories(), vec!["x"]);
        assert_eq!(registry.list_tools().len(), 1);
        for info in registry.list_tools().values() {
            for category in &info.categories {
                assert!(registry
                    .get_tools_by_category(category)
                    .iter()
                    .any(|t| t.name() == info.name));
            }
        }
    }

    #[test]
    fn test_remove_handle_only_removes_matching_instance() {
        let registry = registry();
        let original = tool("dup", "1");
        registry.register_tool(Arc::clone(&original), "mcp");
        registry.register_tool(tool("dup", "2"), "general");

        assert!(!registry.remove_handle(&original));
        assert!(registry.contains("dup"));

        let current = registry.get_tool("dup").unwrap();
        assert!(registry.remove_handle(&current));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_and_info() {
        let registry = registry();
        registry.register_tool(tool("clock", ""), DEFAULT_CATEGORY);

        let info = registry.get_tool_info("clock").unwrap();
        assert_eq!(info.description, "clock tool");
        assert_eq!(info.categories, vec![DEFAULT_CATEGORY]);
        assert_eq!(registry.get_llm_tools()[0].name, "clock");

        registry.clear_tools();
        assert!(registry.is_empty());
        assert!(registry.get_categories().is_empty());
        assert!(registry.get_tool_info("clock").is_none());
    }

    #[tokio::test]
    async fn test_execute_tool_calls() {
        let registry = registry();
        registry.register_tool(tool("ok", "fine"), DEFAULT_CATEGORY);
        registry.register_tool(
            FunctionTool::new("broken", "fails", |_| async {
                Err(ToolError::execution("broken", "disk on fire"))
            })
            .shared(),
            DEFAULT_CATEGORY,
        );

        let results = registry
            .execute_tool_calls(&[
                ToolCall::new("1", "ok", json!({})),
                ToolCall::new("2", "broken", json!({})),
                ToolCall::new("3", "ghost", json!({})),
            ])
            .await;

        assert_eq!(results[0], ToolResult::success("1", "fine"));
        assert!(results[1].is_error);
        assert!(results[1].content.contains("disk on fire"));
        assert!(results[2].is_error);
        assert!(results[2].content.contains("ghost"));
    }

    #[test]
    fn test_concurrent_readers_during_registration() {
        let registry = Arc::new(registry());

        std::thread::scope(|scope| {
            let writer = Arc::clone(&registry);
            scope.spawn(move || {
                for i in 0..200 {
                    // Fresh handles alternate between categories every 20 registrations.
                    let category = if (i / 20) % 2 == 0 { "mcp" } else { "local" };
                    writer.register_tool(tool(&format!("t{}", i % 20), ""), category);
                }
            });
            for _ in 0..4 {
                let reader = Arc::clone(&registry);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let snapshot = reader.list_tools();
                        for (name, info) in &snapshot {
                            assert_eq!(&info.name, name);
                            assert_eq!(info.categories.len(), 1, "{} in {:?}", name, info.categories);
                        }
                    }
                });
            }
        });

        assert_eq!(registry.tool_count(), 20);
        assert_eq!(registry.get_categories(), vec!["local"]);
        assert_eq!(registry.get_tools_by_category("local").len(), 20);
    }
}
