//! Configuration validation rules.
//!
//! Checks `AgentConfig` values after they have been loaded from
//! environment, files, or defaults.

use crate::config::AgentConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AgentConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `version` or `cache_prefix` is empty,
    /// and `ConfigError::Invalid` if:
    /// - `origin` is not an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - a passthrough domain is empty (it would match every URL)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "version".into(),
                hint: "Set OFFCACHE_VERSION environment variable".into(),
            });
        }
        if self.cache_prefix.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_prefix".into(),
                hint: "Set OFFCACHE_CACHE_PREFIX environment variable".into(),
            });
        }

        self.origin_url()?;

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.passthrough_domains.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "passthrough_domains".into(),
                reason: "entries must not be empty".into(),
            });
        }

        if self.seed_urls.is_empty() {
            tracing::warn!("seed_urls is empty; nothing is guaranteed to be available offline");
        }

        Ok(())
    }
}
