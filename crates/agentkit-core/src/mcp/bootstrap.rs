//! MCP tool bootstrap
//!
//! Validates server descriptors, discovers every valid server's tools under
//! one batch timeout and publishes them into a [`ToolRegistry`] under the
//! `"mcp"` category. Construction is a blocking call that never fails;
//! the outcome is observed through [`McpToolBootstrap::is_initialized`] and
//! [`McpToolBootstrap::get_tools`].
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Arc::new(ToolRegistry::new(logger.clone()));
//! let servers = load_mcp_servers("mcp_servers.json")?;
//!
//! let bootstrap = McpToolBootstrap::new(
//!     servers,
//!     BootstrapOptions::default()
//!         .with_registry(Arc::clone(&registry))
//!         .with_logger(logger),
//! );
//!
//! if bootstrap.is_initialized() {
//!     println!("{} MCP tools", bootstrap.get_tools().len());
//! }
//! ```

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Map, Value};

use super::bridge::block_on_isolated;
use super::descriptor::{validate_descriptors, ValidatedServers};
use super::discovery::{McpDiscovery, ToolDiscovery};
use crate::config::AppConfig;
use crate::logging::{Logger, NoOpLogger};
use crate::tools::{SharedTool, ToolRegistry};

/// Registry category for discovered tools
pub const MCP_CATEGORY: &str = "mcp";

/// Bound on one whole discovery batch
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborators and limits for a bootstrap
#[derive(Clone)]
pub struct BootstrapOptions {
    pub registry: Option<Arc<ToolRegistry>>,
    pub timeout: Duration,
    /// Defaults to [`McpDiscovery`] over real connections
    pub discovery: Option<Arc<dyn ToolDiscovery>>,
    pub logger: Arc<dyn Logger>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            registry: None,
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            discovery: None,
            logger: NoOpLogger::shared(),
        }
    }
}

impl BootstrapOptions {
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn ToolDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

/// How a discovery attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Not run yet, or a refresh is in progress
    Pending,
    Discovered,
    /// Nothing to connect to; no connection was attempted
    NoValidServers,
    /// The batch did not finish within the timeout; its tools were discarded
    TimedOut,
    Failed(String),
}

/// Terminal result of one discovery attempt
#[derive(Clone)]
pub struct DiscoveryResult {
    pub initialized: bool,
    pub tools: Vec<SharedTool>,
    pub failed_servers: BTreeSet<String>,
    pub outcome: DiscoveryOutcome,
}

impl DiscoveryResult {
    fn pending() -> Self {
        Self {
            initialized: false,
            tools: Vec::new(),
            failed_servers: BTreeSet::new(),
            outcome: DiscoveryOutcome::Pending,
        }
    }

    fn empty(initialized: bool, failed_servers: BTreeSet<String>, outcome: DiscoveryOutcome) -> Self {
        Self {
            initialized,
            tools: Vec::new(),
            failed_servers,
            outcome,
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }
}

impl std::fmt::Debug for DiscoveryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryResult")
            .field("initialized", &self.initialized)
            .field("tools", &self.tool_names())
            .field("failed_servers", &self.failed_servers)
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// Summary returned by [`McpToolBootstrap::get_client_info`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub initialized: bool,
    pub tool_count: usize,
    pub config_servers: usize,
}

/// Discovers MCP tools once at construction and on explicit refresh
pub struct McpToolBootstrap {
    config: Map<String, Value>,
    servers: ValidatedServers,
    registry: Option<Arc<ToolRegistry>>,
    discovery: Arc<dyn ToolDiscovery>,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    state: RwLock<DiscoveryResult>,
    /// Serializes refreshes
    run_lock: Mutex<()>,
    batches: AtomicUsize,
}

impl McpToolBootstrap {
    /// Validate `config` and run discovery before returning
    pub fn new(config: Map<String, Value>, options: BootstrapOptions) -> Self {
        let logger = options.logger;
        logger.info(&format!(
            "[McpBootstrap] Configured servers: [{}]",
            config.keys().cloned().collect::<Vec<_>>().join(", ")
        ));

        let servers = validate_descriptors(&config, logger.as_ref());
        let discovery = options
            .discovery
            .unwrap_or_else(|| Arc::new(McpDiscovery::new(Arc::clone(&logger))));

        let bootstrap = Self {
            config,
            servers,
            registry: options.registry,
            discovery,
            timeout: options.timeout,
            logger,
            state: RwLock::new(DiscoveryResult::pending()),
            run_lock: Mutex::new(()),
            batches: AtomicUsize::new(0),
        };

        let result = bootstrap.run();
        *bootstrap.state.write() = result;
        bootstrap
    }

    /// Bootstrap from the `mcp` section of an application config
    pub fn from_config(config: &AppConfig, options: BootstrapOptions) -> Self {
        Self::new(config.mcp_servers(), options)
    }

    fn run(&self) -> DiscoveryResult {
        if self.servers.is_empty() {
            self.logger
                .warn("[McpBootstrap] No valid MCP server configuration; skipping discovery");
            return DiscoveryResult::empty(
                true,
                self.servers.invalid.clone(),
                DiscoveryOutcome::NoValidServers,
            );
        }

        let all_failed: BTreeSet<String> = self
            .servers
            .invalid
            .iter()
            .chain(self.servers.valid.keys())
            .cloned()
            .collect();

        self.batches.fetch_add(1, Ordering::SeqCst);
        self.logger.info(&format!(
            "[McpBootstrap] Connecting to {} valid servers",
            self.servers.valid.len()
        ));

        let discovery = Arc::clone(&self.discovery);
        let servers = self.servers.valid.clone();
        let timeout = self.timeout;
        let bridged = block_on_isolated(move || async move {
            tokio::time::timeout(timeout, discovery.discover(&servers)).await
        });

        let tools = match bridged {
            Ok(Ok(Ok(tools))) => tools,
            Ok(Ok(Err(e))) => {
                self.logger
                    .error(&format!("[McpBootstrap] Discovery failed: {}", e));
                return DiscoveryResult::empty(false, all_failed, DiscoveryOutcome::Failed(e.to_string()));
            }
            Ok(Err(_elapsed)) => {
                self.logger.error(&format!(
                    "[McpBootstrap] Discovery timed out after {:?}",
                    timeout
                ));
                return DiscoveryResult::empty(true, all_failed, DiscoveryOutcome::TimedOut);
            }
            Err(e) => {
                self.logger
                    .error(&format!("[McpBootstrap] Discovery aborted: {}", e));
                return DiscoveryResult::empty(false, all_failed, DiscoveryOutcome::Failed(e.to_string()));
            }
        };

        if let Some(registry) = &self.registry {
            if !tools.is_empty() {
                registry.register_tools(&tools, MCP_CATEGORY);
            }
        }

        self.logger.info(&format!(
            "[McpBootstrap] Initialized {} MCP tools",
            tools.len()
        ));

        DiscoveryResult {
            initialized: true,
            tools,
            failed_servers: self.servers.invalid.clone(),
            outcome: DiscoveryOutcome::Discovered,
        }
    }

    /// Discovered tools; empty until discovery reached a terminal state
    pub fn get_tools(&self) -> Vec<SharedTool> {
        let state = self.state.read();
        if !state.initialized {
            self.logger
                .warn("[McpBootstrap] MCP tools are not initialized; returning no tools");
            return Vec::new();
        }
        state.tools.clone()
    }

    pub fn get_tool_by_name(&self, name: &str) -> Option<SharedTool> {
        self.state
            .read()
            .tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// Snapshot of the latest discovery result
    pub fn result(&self) -> DiscoveryResult {
        self.state.read().clone()
    }

    pub fn failed_servers(&self) -> BTreeSet<String> {
        self.state.read().failed_servers.clone()
    }

    pub fn outcome(&self) -> DiscoveryOutcome {
        self.state.read().outcome.clone()
    }

    /// Drop the cached tools and rerun discovery against the same servers
    ///
    /// Tools this bootstrap registered earlier are removed from the registry
    /// first, unless something else has since replaced them.
    pub fn refresh(&self) -> Vec<SharedTool> {
        let _guard = self.run_lock.lock();
        self.logger.info("[McpBootstrap] Refreshing MCP tools");

        let previous = std::mem::replace(&mut *self.state.write(), DiscoveryResult::pending());
        if let Some(registry) = &self.registry {
            for tool in &previous.tools {
                registry.remove_handle(tool);
            }
        }

        let result = self.run();
        let tools = result.tools.clone();
        *self.state.write() = result;
        tools
    }

    pub fn get_client_info(&self) -> ClientInfo {
        let state = self.state.read();
        ClientInfo {
            initialized: state.initialized,
            tool_count: state.tools.len(),
            config_servers: self.config.len(),
        }
    }

    /// Number of discovery batches launched against servers
    pub fn discovery_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// The raw descriptor mapping given at construction
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn valid_servers(&self) -> Vec<String> {
        self.servers.valid.keys().cloned().collect()
    }
}

impl std::fmt::Debug for McpToolBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolBootstrap")
            .field("servers", &self.valid_servers())
            .field("timeout", &self.timeout)
            .field("state", &*self.state.read())
            .finish()
    }
}
