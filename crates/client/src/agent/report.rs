//! Outcomes of the lifecycle and fetch handlers.

use std::fmt;

use offcache_core::AgentResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle position of an agent instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    New,
    Installing,
    /// Installed and waiting to be activated.
    Installed,
    Activating,
    /// Controlling pages. A later install of the same agent keeps this state.
    Active,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::New => "new",
            AgentState::Installing => "installing",
            AgentState::Installed => "installed",
            AgentState::Activating => "activating",
            AgentState::Active => "active",
        };
        f.write_str(s)
    }
}

/// A seed URL that could not be stored at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeedFailure {
    pub url: String,
    pub reason: String,
}

/// Result of the install handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub cache_name: String,
    /// Seed URLs now present in the generation, in seed order.
    pub cached: Vec<String>,
    pub failed: Vec<SeedFailure>,
    /// Host should activate this agent without waiting for old pages to close.
    pub skip_waiting: bool,
}

/// Result of the activate handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Superseded generations removed from the store.
    pub deleted: Vec<String>,
    /// Host should route already-open pages through this agent.
    pub claim_clients: bool,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Network,
    Cache,
    Offline,
}

/// Why a request was not intercepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassthroughReason {
    /// The agent has not been activated yet.
    NotControlling,
    /// Only GET requests are intercepted.
    Method(String),
    /// URL matched a passthrough domain.
    Domain(String),
}

/// What the fetch handler decided for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Not intercepted; the host sends the request over the network itself.
    Passthrough(PassthroughReason),
    /// Intercepted and answered.
    Respond { response: AgentResponse, source: FetchSource },
}

impl FetchDecision {
    pub fn response(&self) -> Option<&AgentResponse> {
        match self {
            FetchDecision::Respond { response, .. } => Some(response),
            FetchDecision::Passthrough(_) => None,
        }
    }

    pub fn source(&self) -> Option<FetchSource> {
        match self {
            FetchDecision::Respond { source, .. } => Some(*source),
            FetchDecision::Passthrough(_) => None,
        }
    }
}
