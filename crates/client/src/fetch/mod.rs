//! Network access for the agent.
//!
//! ### The `Network` seam
//! The agent never talks to reqwest directly; it goes through [`Network`],
//! so the lifecycle and fetch handlers can be driven by any transport.
//!
//! ### `HttpNetwork`
//! - Any HTTP status is a successful fetch; errors are transport failures
//!   or a body over the size limit
//! - Responses are typed `basic` when the final URL shares the agent origin,
//!   `cors` otherwise
//! - `CacheMode::Reload` bypasses intermediate HTTP caches
//! - Max redirects: 5, max body bytes: 5MB (configurable)

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, is_same_origin, resolve};

use offcache_core::{AgentConfig, AgentRequest, AgentResponse, CacheMode, Error, ResponseType};

/// Something that can perform a live fetch.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request over the live network.
    ///
    /// Resolves for every HTTP status. Errors mean no response was obtained.
    async fn fetch(&self, request: &AgentRequest) -> Result<AgentResponse, Error>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "offcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "offcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AgentConfig> for FetchConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
    origin: reqwest::Url,
}

impl HttpNetwork {
    /// Create a network client for an agent controlling `origin`.
    pub fn new(config: FetchConfig, origin: reqwest::Url) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config, origin })
    }

    fn too_large(&self, len: usize) -> Error {
        Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes))
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AgentRequest) -> Result<AgentResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {}", request.method(), e)))?;

        let mut builder = self.http.request(method, request.url().clone());
        if request.cache_mode() == CacheMode::Reload {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder.send().await.map_err(transport_error)?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        let body = response.bytes().await.map_err(transport_error)?;

        if body.len() > self.config.max_bytes {
            return Err(self.too_large(body.len()));
        }

        let response_type = if is_same_origin(&final_url, &self.origin) { ResponseType::Basic } else { ResponseType::Cors };

        tracing::debug!(
            "fetched {} {} -> {} {} in {}ms ({} bytes, {})",
            request.method(),
            request.url(),
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len(),
            response_type
        );

        Ok(AgentResponse {
            url: Some(final_url.to_string()),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            response_type,
        })
    }
}
