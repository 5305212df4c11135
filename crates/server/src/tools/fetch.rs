//! agent_fetch tool implementation.
//!
//! Dispatches one page request through the agent. Requests the agent does
//! not intercept are sent to the network directly, as the host would.

use offcache_client::{CachingAgent, FetchDecision, FetchSource, PassthroughReason};
use offcache_core::{AgentRequest, AgentResponse, Error, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchParams {
    /// The URL to fetch. Relative URLs resolve against the agent origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Where the returned response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    Offline,
    /// Not intercepted by the agent.
    Passthrough,
}

impl From<FetchSource> for ResponseSource {
    fn from(source: FetchSource) -> Self {
        match source {
            FetchSource::Network => ResponseSource::Network,
            FetchSource::Cache => ResponseSource::Cache,
            FetchSource::Offline => ResponseSource::Offline,
        }
    }
}

/// Output structure for agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    pub source: ResponseSource,
    /// Why the agent did not intercept, when `source` is passthrough.
    pub passthrough_reason: Option<String>,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

impl AgentFetchOutput {
    fn new(request: &AgentRequest, response: &AgentResponse, source: ResponseSource, reason: Option<String>) -> Self {
        Self {
            url: request.url().to_string(),
            method: request.method().to_string(),
            source,
            passthrough_reason: reason,
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type,
            headers: response.headers.clone(),
            body: response.text().into_owned(),
            body_bytes: response.body.len(),
        }
    }
}

fn describe(reason: &PassthroughReason) -> String {
    match reason {
        PassthroughReason::NotControlling => "agent is not controlling".into(),
        PassthroughReason::Method(method) => format!("method {method} is not intercepted"),
        PassthroughReason::Domain(domain) => format!("matches passthrough domain {domain}"),
    }
}

/// Implementation of the agent_fetch tool.
pub async fn fetch_impl(agent: &CachingAgent, params: AgentFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let url = agent.resolve(&params.url)?;
    let request = AgentRequest::new(&params.method, url)?;

    let output = match agent.handle_fetch(request.clone()).await? {
        FetchDecision::Respond { response, source } => AgentFetchOutput::new(&request, &response, source.into(), None),
        FetchDecision::Passthrough(reason) => {
            tracing::debug!(url = %request.url(), reason = ?reason, "request not intercepted");
            let response = agent.network().fetch(&request).await?;
            AgentFetchOutput::new(&request, &response, ResponseSource::Passthrough, Some(describe(&reason)))
        }
    };

    json_result(&output)
}
