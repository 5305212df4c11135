//! Agent configuration with layered loading.
//!
//! Configuration is loaded with figment from multiple sources:
//!
//! 1. Environment variables (OFFCACHE_*)
//! 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Resources cached at install time so the app shell works offline.
const DEFAULT_SEED_URLS: &[&str] = &[
    "/",
    "/index.html",
    "/zele-church-escalas.html",
    "https://cdn.tailwindcss.com",
    "https://www.gstatic.com/firebasejs/10.7.1/firebase-app.js",
    "https://www.gstatic.com/firebasejs/10.7.1/firebase-auth.js",
    "https://www.gstatic.com/firebasejs/10.7.1/firebase-firestore.js",
    "https://cdn.jsdelivr.net/npm/@emailjs/browser@4/dist/email.min.js",
];

/// Backends that must always hit the live network.
const DEFAULT_PASSTHROUGH_DOMAINS: &[&str] = &["firebaseio.com", "googleapis.com", "emailjs.com"];

/// Agent configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFCACHE_*)
/// 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Prefix of every generation name.
    ///
    /// Set via OFFCACHE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Agent version. Bumping it creates a new generation on install and
    /// deletes the old one on activate.
    ///
    /// Set via OFFCACHE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin the agent controls. Relative URLs resolve against it and
    /// responses from it count as same-origin.
    ///
    /// Set via OFFCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via OFFCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// URLs fetched and stored at install time, in order.
    #[serde(default = "default_seed_urls")]
    pub seed_urls: Vec<String>,

    /// URL substrings that are never intercepted.
    #[serde(default = "default_passthrough_domains")]
    pub passthrough_domains: Vec<String>,

    /// Body of the 503 response served when offline with no cached entry.
    ///
    /// Set via OFFCACHE_OFFLINE_MESSAGE environment variable.
    #[serde(default = "default_offline_message")]
    pub offline_message: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via OFFCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via OFFCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to buffer per response.
    ///
    /// Set via OFFCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_cache_prefix() -> String {
    "zele-server".into()
}

fn default_version() -> String {
    "v2.3.0".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offcache.sqlite")
}

fn default_seed_urls() -> Vec<String> {
    DEFAULT_SEED_URLS.iter().map(|s| s.to_string()).collect()
}

fn default_passthrough_domains() -> Vec<String> {
    DEFAULT_PASSTHROUGH_DOMAINS.iter().map(|s| s.to_string()).collect()
}

fn default_offline_message() -> String {
    "Offline - Sem conexão com internet".into()
}

fn default_user_agent() -> String {
    "offcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            seed_urls: default_seed_urls(),
            passthrough_domains: default_passthrough_domains(),
            offline_message: default_offline_message(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AgentConfig {
    /// Name of the generation owned by this version of the agent.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed agent origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute
    /// http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let parsed = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() {
            Ok(parsed)
        } else {
            Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL with a host".into() })
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFCACHE_`
    /// 2. TOML file from `OFFCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("OFFCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
