//! agent_install, agent_activate and agent_status tool implementations.

use offcache_client::{AgentState, CachingAgent};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Output from the agent_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentStatusOutput {
    pub state: AgentState,
    /// Name of the generation this agent owns.
    pub cache_name: String,
    /// Whether that generation is present in the store.
    pub cache_exists: bool,
    pub origin: String,
    /// Whether page requests are routed through the agent.
    pub controlling: bool,
    /// Entries currently stored in the agent's generation.
    pub entry_count: u64,
}

/// Implementation of the agent_install tool.
pub async fn install_impl(agent: &CachingAgent) -> Result<CallToolResult, McpError> {
    let report = agent.install().await?;
    json_result(&report)
}

/// Implementation of the agent_activate tool.
pub async fn activate_impl(agent: &CachingAgent) -> Result<CallToolResult, McpError> {
    let report = agent.activate().await?;
    json_result(&report)
}

/// Implementation of the agent_status tool.
pub async fn status_impl(agent: &CachingAgent) -> Result<CallToolResult, McpError> {
    let output = AgentStatusOutput {
        state: agent.state().await,
        cache_name: agent.cache_name().to_string(),
        cache_exists: agent.caches().has_generation(agent.cache_name()).await?,
        origin: agent.origin().to_string(),
        controlling: agent.is_controlling(),
        entry_count: agent.generation().len().await?,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticNetwork, agent_with, output};
    use offcache_client::{ActivateReport, InstallReport};

    #[tokio::test]
    async fn test_install_then_activate() {
        let network = StaticNetwork::offline().with_page("http://localhost:8080/index.html", "<h1>Zele</h1>");
        let agent = agent_with(network, &["/index.html", "/zele-church-escalas.html"]).await;

        let install: InstallReport = output(&install_impl(&agent).await.unwrap());
        assert_eq!(install.cache_name, "zele-server-v1");
        assert_eq!(install.cached, vec!["http://localhost:8080/index.html"]);
        assert_eq!(install.failed.len(), 1);
        assert!(install.skip_waiting);

        let activate: ActivateReport = output(&activate_impl(&agent).await.unwrap());
        assert!(activate.claim_clients);
        assert!(activate.deleted.is_empty());

        let status: AgentStatusOutput = output(&status_impl(&agent).await.unwrap());
        assert_eq!(status.state, AgentState::Active);
        assert!(status.cache_exists);
        assert!(status.controlling);
        assert_eq!(status.entry_count, 1);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_error() {
        let agent = agent_with(StaticNetwork::offline(), &[]).await;
        let err = activate_impl(&agent).await.unwrap_err();
        assert_eq!(err.code.0, -32013);
    }

    #[tokio::test]
    async fn test_status_after_reinstall_stays_active() {
        let agent = agent_with(StaticNetwork::offline(), &[]).await;
        install_impl(&agent).await.unwrap();
        activate_impl(&agent).await.unwrap();
        install_impl(&agent).await.unwrap();

        let status: AgentStatusOutput = output(&status_impl(&agent).await.unwrap());
        assert_eq!(status.state, AgentState::Active);
        assert!(status.controlling);
    }

    #[tokio::test]
    async fn test_status_of_new_agent() {
        let agent = agent_with(StaticNetwork::offline(), &[]).await;
        let status: AgentStatusOutput = output(&status_impl(&agent).await.unwrap());
        assert_eq!(status.state, AgentState::New);
        assert!(!status.cache_exists);
        assert!(!status.controlling);
        assert_eq!(status.entry_count, 0);
        assert_eq!(status.origin, "http://localhost:8080/");
    }
}
