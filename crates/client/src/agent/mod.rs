//! The caching agent: install, activate and fetch handlers.
//!
//! One agent instance owns one cache generation, named after its version.
//!
//! - **install** opens the generation and stores the seed resources,
//!   tolerating any seed that cannot be fetched
//! - **activate** deletes every other generation and takes control
//! - **fetch** answers GET requests network-first, writing successful
//!   same-origin responses through to the cache and falling back to it
//!   (or to a synthesized 503) when the network is unreachable
//!
//! Lifecycle handlers await every store and network operation before
//! returning. The fetch write-through is spawned and not awaited by the
//! response path; [`CachingAgent::settle`] waits for outstanding writes.

mod passthrough;
mod report;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use url::Url;

use offcache_core::{AgentConfig, AgentRequest, AgentResponse, CacheDb, CacheMode, Error, Generation};

use crate::fetch::{Network, resolve};

pub use passthrough::PassthroughRules;
pub use report::{ActivateReport, AgentState, FetchDecision, FetchSource, InstallReport, PassthroughReason, SeedFailure};

/// Offline caching agent for a single origin.
pub struct CachingAgent {
    cache_name: String,
    origin: Url,
    seed_urls: Vec<String>,
    passthrough: PassthroughRules,
    offline_message: String,
    caches: CacheDb,
    network: Arc<dyn Network>,
    state: RwLock<AgentState>,
    controlling: AtomicBool,
    pending_writes: Mutex<JoinSet<()>>,
}

impl CachingAgent {
    /// Create an agent for the configured version and origin.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the configured origin is not usable.
    pub fn new(config: &AgentConfig, caches: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            cache_name: config.cache_name(),
            origin,
            seed_urls: config.seed_urls.clone(),
            passthrough: PassthroughRules::new(config.passthrough_domains.iter().cloned()),
            offline_message: config.offline_message.clone(),
            caches,
            network,
            state: RwLock::new(AgentState::New),
            controlling: AtomicBool::new(false),
            pending_writes: Mutex::new(JoinSet::new()),
        })
    }

    /// Name of the generation this agent owns.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn caches(&self) -> &CacheDb {
        &self.caches
    }

    /// The network used for live fetches, also used by hosts for passthrough.
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    /// Handle to the current generation.
    pub fn generation(&self) -> Generation {
        self.caches.generation(&self.cache_name)
    }

    pub async fn state(&self) -> AgentState {
        *self.state.read().await
    }

    /// Whether fetches are routed through this agent. Set by the first
    /// successful activation and never cleared.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::Acquire)
    }

    /// Resolve a URL against the agent origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        resolve(&self.origin, input).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    async fn set_state(&self, state: AgentState) {
        *self.state.write().await = state;
    }

    /// Install handler: open the generation and store the seed resources.
    ///
    /// Seeds are fetched concurrently with [`CacheMode::Reload`]. A seed is
    /// stored only if its response status is 2xx. Seed failures are logged
    /// and reported but never fail the install.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generation itself cannot be opened; the
    /// agent then returns to the state it was in before.
    ///
    /// Re-installing an active agent refreshes the seeds but leaves it
    /// `Active` and controlling.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let previous = self.state().await;
        let reinstall = previous == AgentState::Active;
        if !reinstall {
            self.set_state(AgentState::Installing).await;
        }
        tracing::info!(cache = %self.cache_name, "installing caching agent");

        let generation = match self.caches.open_generation(&self.cache_name).await {
            Ok(g) => g,
            Err(e) => {
                self.set_state(previous).await;
                return Err(e);
            }
        };

        let results = join_all(self.seed_urls.iter().map(|raw| self.store_seed(&generation, raw))).await;

        let mut cached = Vec::new();
        let mut failed = Vec::new();
        for (raw, result) in self.seed_urls.iter().zip(results) {
            match result {
                Ok(url) => cached.push(url),
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "seed resource not cached");
                    failed.push(SeedFailure { url: raw.clone(), reason: e.to_string() });
                }
            }
        }

        if !failed.is_empty() {
            tracing::warn!(
                cache = %self.cache_name,
                cached = cached.len(),
                failed = failed.len(),
                "some seed resources were not cached"
            );
        }

        if !reinstall {
            self.set_state(AgentState::Installed).await;
        }
        tracing::info!(cache = %self.cache_name, cached = cached.len(), "caching agent installed, skipping wait");

        Ok(InstallReport { cache_name: self.cache_name.clone(), cached, failed, skip_waiting: true })
    }

    async fn store_seed(&self, generation: &Generation, raw: &str) -> Result<String, Error> {
        let url = self.resolve(raw)?;
        let request = AgentRequest::get(url).with_cache_mode(CacheMode::Reload);
        let response = self.network.fetch(&request).await?;

        if !response.is_ok() {
            return Err(Error::HttpError(format!("status {}", response.status)));
        }

        generation.put(&request, &response).await?;
        Ok(request.url().to_string())
    }

    /// Activate handler: delete superseded generations and take control.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless the agent is installed or already
    /// active, and store errors from listing or deleting generations.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let previous = self.state().await;
        if !matches!(previous, AgentState::Installed | AgentState::Active) {
            return Err(Error::InvalidState(format!("cannot activate while {previous}")));
        }

        self.set_state(AgentState::Activating).await;
        tracing::info!(cache = %self.cache_name, "activating caching agent");

        let deleted = match self.delete_superseded().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.set_state(previous).await;
                return Err(e);
            }
        };

        self.controlling.store(true, Ordering::Release);
        self.set_state(AgentState::Active).await;
        tracing::info!(cache = %self.cache_name, deleted = deleted.len(), "caching agent active, claiming clients");

        Ok(ActivateReport { cache_name: self.cache_name.clone(), deleted, claim_clients: true })
    }

    async fn delete_superseded(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.caches.generation_names().await? {
            if name == self.cache_name {
                continue;
            }
            if self.caches.delete_generation(&name).await? {
                tracing::info!(cache = %name, "deleted superseded cache generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Fetch handler: decide whether to intercept and, if so, answer
    /// network-first with cache fallback.
    ///
    /// Only transport failures fall back to the cache; with no entry the
    /// answer is the synthesized offline response.
    ///
    /// # Errors
    ///
    /// Returns the network error when a server answered but the response
    /// could not be taken (e.g. `Error::FetchTooLarge`). Neither the cache
    /// nor the offline response stands in for a reachable server.
    pub async fn handle_fetch(&self, request: AgentRequest) -> Result<FetchDecision, Error> {
        if !self.is_controlling() {
            return Ok(FetchDecision::Passthrough(PassthroughReason::NotControlling));
        }
        if !request.is_get() {
            return Ok(FetchDecision::Passthrough(PassthroughReason::Method(request.method().to_string())));
        }
        if let Some(domain) = self.passthrough.matching(request.url()) {
            return Ok(FetchDecision::Passthrough(PassthroughReason::Domain(domain.to_string())));
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.write_through(request, response.clone()).await;
                }
                Ok(FetchDecision::Respond { response, source: FetchSource::Network })
            }
            Err(e) if e.is_transport() => {
                tracing::debug!(url = %request.url(), error = %e, "network fetch failed, trying cache");
                Ok(self.fallback(&request).await)
            }
            Err(e) => {
                tracing::warn!(url = %request.url(), error = %e, "network response unusable");
                Err(e)
            }
        }
    }

    async fn fallback(&self, request: &AgentRequest) -> FetchDecision {
        match self.generation().match_request(request).await {
            Ok(Some(response)) => {
                tracing::info!(url = %request.url(), "serving from cache");
                FetchDecision::Respond { response, source: FetchSource::Cache }
            }
            Ok(None) => self.offline(),
            Err(e) => {
                tracing::warn!(url = %request.url(), error = %e, "cache lookup failed");
                self.offline()
            }
        }
    }

    fn offline(&self) -> FetchDecision {
        FetchDecision::Respond { response: AgentResponse::offline(&self.offline_message), source: FetchSource::Offline }
    }

    /// Queue a cache write without blocking the response path.
    async fn write_through(&self, request: AgentRequest, response: AgentResponse) {
        let caches = self.caches.clone();
        let cache_name = self.cache_name.clone();

        let mut pending = self.pending_writes.lock().await;
        while pending.try_join_next().is_some() {}

        pending.spawn(async move {
            let result = async { caches.open_generation(&cache_name).await?.put(&request, &response).await }.await;
            if let Err(e) = result {
                tracing::warn!(url = %request.url(), error = %e, "cache write failed");
            }
        });
    }

    /// Wait for every queued cache write to finish.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.pending_writes.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "cache write task did not complete");
            }
        }
    }
}
