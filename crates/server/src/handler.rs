//! MCP server handler implementation.
//!
//! Bridges host lifecycle and fetch events to the caching agent by routing
//! tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    cache::{CacheGetParams, get_impl, list_impl},
    fetch::{AgentFetchParams, fetch_impl},
    lifecycle::{activate_impl, install_impl, status_impl},
};
use offcache_client::CachingAgent;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler wrapping one caching agent.
#[derive(Clone)]
pub struct OfflineAgentServer {
    agent: Arc<CachingAgent>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OfflineAgentServer {
    /// Create a new server handler for an agent.
    pub fn new(agent: Arc<CachingAgent>) -> Self {
        Self { agent, tool_router: Self::tool_router() }
    }

    #[tool(description = "Run the install phase: open the current cache generation and store the seed resources.")]
    async fn agent_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.agent).await
    }

    #[tool(description = "Run the activate phase: delete superseded cache generations and take control of pages.")]
    async fn agent_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.agent).await
    }

    #[tool(description = "Report the agent lifecycle state, current generation and whether it controls pages.")]
    async fn agent_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.agent).await
    }

    /// Dispatch a page request through the agent.
    ///
    /// GET requests are answered network-first with cache fallback; anything
    /// the agent does not intercept goes straight to the network.
    #[tool(description = "Fetch a URL through the caching agent (network first, cache fallback, offline 503).")]
    async fn agent_fetch(&self, params: Parameters<AgentFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.agent, params.0).await
    }

    #[tool(description = "List cache generations with their entry counts.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.agent).await
    }

    #[tool(description = "Get the cached response for GET <url> from the current generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.agent, params.0).await
    }
}

impl ServerHandler for OfflineAgentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticNetwork, active_agent};

    #[tokio::test]
    async fn test_router_lists_all_tools() {
        let agent = active_agent(StaticNetwork::offline()).await;
        let server = OfflineAgentServer::new(Arc::new(agent));

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec!["agent_activate", "agent_fetch", "agent_install", "agent_status", "cache_get", "cache_list"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let agent = active_agent(StaticNetwork::offline()).await;
        let server = OfflineAgentServer::new(Arc::new(agent));

        let info = server.get_info();
        assert_eq!(info.server_info.name, "offcache");
        assert!(info.capabilities.tools.is_some());
    }
}
