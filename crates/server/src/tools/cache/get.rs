//! cache_get tool implementation.
//!
//! Retrieves the cached response for `GET <url>` from the current generation.

use offcache_client::CachingAgent;
use offcache_core::{AgentRequest, Error, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the cached resource. Relative URLs resolve against the agent origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub cache_name: String,
    pub url: String,
    /// Final URL the response was fetched from.
    pub response_url: Option<String>,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(agent: &CachingAgent, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = agent.resolve(&params.url)?;
    let request = AgentRequest::get(url);

    let response = agent
        .generation()
        .match_request(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url().to_string()))?;

    let output = CacheGetOutput {
        cache_name: agent.cache_name().to_string(),
        url: request.url().to_string(),
        response_url: response.url.clone(),
        status: response.status,
        status_text: response.status_text.clone(),
        response_type: response.response_type,
        headers: response.headers.clone(),
        body: response.text().into_owned(),
        body_bytes: response.body.len(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticNetwork, agent_with, output};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let agent = agent_with(StaticNetwork::offline(), &[]).await;
        let params = CacheGetParams { url: "/nonexistent".to_string() };

        let err = get_impl(&agent, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found_after_install() {
        let network = StaticNetwork::offline().with_page("http://localhost:8080/index.html", "<h1>Zele</h1>");
        let agent = agent_with(network, &["/index.html"]).await;
        agent.install().await.unwrap();

        let out: CacheGetOutput =
            output(&get_impl(&agent, CacheGetParams { url: "/index.html#top".into() }).await.unwrap());

        assert_eq!(out.cache_name, "zele-server-v1");
        assert_eq!(out.url, "http://localhost:8080/index.html");
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "<h1>Zele</h1>");
        assert_eq!(out.response_type, ResponseType::Basic);
    }
}
