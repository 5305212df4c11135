//! offcache entry point.
//!
//! Boots the caching agent for the configured version, runs its install and
//! activate phases, then serves the agent's tools over MCP stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offcache_client::{CachingAgent, FetchConfig, HttpNetwork};
use offcache_core::{AgentConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AgentConfig::load()?;

    tracing::info!(
        cache = %config.cache_name(),
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "Starting offcache agent on stdio transport"
    );

    let caches = CacheDb::open(&config.db_path).await?;
    let network = HttpNetwork::new(FetchConfig::from(&config), config.origin_url()?)?;
    let agent = Arc::new(CachingAgent::new(&config, caches, Arc::new(network))?);

    agent.install().await?;
    agent.activate().await?;

    let handler = handler::OfflineAgentServer::new(agent.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    agent.settle().await;

    Ok(())
}
