//! Outbound request model seen by the agent.

use url::Url;

use crate::Error;
use crate::cache::hash::compute_cache_key;

/// Methods whose spelling is normalized to uppercase, matching how browsers
/// treat request methods. Any other method keeps its case.
const NORMALIZED_METHODS: &[&str] = &["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// How the request interacts with intermediate HTTP caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Let intermediate caches answer as usual.
    #[default]
    Default,
    /// Force a fresh fetch from the origin server.
    Reload,
}

/// A request as intercepted by the agent: method, URL and cache mode.
///
/// The fragment is always stripped from the URL, so two requests that only
/// differ by fragment share a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    method: String,
    url: Url,
    cache_mode: CacheMode,
}

impl AgentRequest {
    /// Build a request, validating and normalizing the method.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the method is empty or contains
    /// characters that are not valid in an HTTP token.
    pub fn new(method: &str, mut url: Url) -> Result<Self, Error> {
        let method = method.trim();
        if method.is_empty() {
            return Err(Error::InvalidInput("method cannot be empty".into()));
        }
        if !method.bytes().all(is_token_byte) {
            return Err(Error::InvalidInput(format!("invalid method: {method}")));
        }

        let upper = method.to_ascii_uppercase();
        let method = if NORMALIZED_METHODS.contains(&upper.as_str()) { upper } else { method.to_string() };

        url.set_fragment(None);
        Ok(Self { method, url, cache_mode: CacheMode::Default })
    }

    /// Shorthand for a plain GET request.
    pub fn get(mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: "GET".into(), url, cache_mode: CacheMode::Default }
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key under which this request's response is stored.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}

/// RFC 9110 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
