//! cache_list tool implementation.
//!
//! Lists every stored generation, marking the agent's current one.

use offcache_client::CachingAgent;
use offcache_core::GenerationInfo;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Name of the agent's own generation.
    pub current: String,
    pub generations: Vec<GenerationInfo>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(agent: &CachingAgent) -> Result<CallToolResult, McpError> {
    let output =
        CacheListOutput { current: agent.cache_name().to_string(), generations: agent.caches().list_generations().await? };
    json_result(&output)
}
