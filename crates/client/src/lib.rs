//! Client side of offcache.
//!
//! This crate provides the network layer and the caching agent built on top
//! of the core cache storage.

pub mod agent;
pub mod fetch;

pub use agent::{
    ActivateReport, AgentState, CachingAgent, FetchDecision, FetchSource, InstallReport, PassthroughReason,
    PassthroughRules, SeedFailure,
};

pub use fetch::{FetchConfig, HttpNetwork, Network};
