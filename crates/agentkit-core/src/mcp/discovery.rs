//! Tool discovery across a batch of servers

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use super::client::{McpClient, McpResult};
use super::descriptor::ServerDescriptor;
use super::tool::McpToolHandle;
use crate::logging::Logger;
use crate::tools::SharedTool;

/// Fetches the tools advertised by a set of servers
///
/// The batch is atomic: either every server answers and all tools are
/// returned, or the whole call fails.
#[async_trait]
pub trait ToolDiscovery: Send + Sync {
    async fn discover(&self, servers: &BTreeMap<String, ServerDescriptor>) -> McpResult<Vec<SharedTool>>;
}

/// Discovery over real MCP connections
pub struct McpDiscovery {
    logger: Arc<dyn Logger>,
}

impl McpDiscovery {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    async fn discover_one(&self, descriptor: &ServerDescriptor) -> McpResult<Vec<SharedTool>> {
        let client = McpClient::connect(descriptor, Arc::clone(&self.logger)).await?;
        let listed = client.list_tools().await;
        if let Err(e) = client.close().await {
            self.logger.debug(&format!(
                "[McpDiscovery] Closing '{}' after discovery failed: {}",
                descriptor.name, e
            ));
        }

        Ok(listed?
            .iter()
            .map(|tool| {
                Arc::new(McpToolHandle::from_mcp(tool, descriptor, Arc::clone(&self.logger)))
                    as SharedTool
            })
            .collect())
    }
}

#[async_trait]
impl ToolDiscovery for McpDiscovery {
    async fn discover(&self, servers: &BTreeMap<String, ServerDescriptor>) -> McpResult<Vec<SharedTool>> {
        let per_server = try_join_all(servers.values().map(|d| self.discover_one(d))).await?;
        Ok(per_server.into_iter().flatten().collect())
    }
}
