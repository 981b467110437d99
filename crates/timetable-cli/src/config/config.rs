//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Portal connection settings.
    #[serde(default)]
    pub portal: PortalConfig,
    /// Cache lifetimes.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Portal connection configuration. Unset fields use the library defaults.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Portal base URL.
    pub base_url: Option<String>,
    /// Locale sent as `lang` and `Accept-Language`.
    pub locale: Option<String>,
    /// Outbound User-Agent.
    pub user_agent: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Cache TTL configuration in seconds.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// TTL of discovered periods and programs.
    pub discovery_ttl_secs: Option<u64>,
    /// TTL of live-data results.
    pub live_ttl_secs: Option<u64>,
}

impl PortalConfig {
    /// Configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CacheConfig {
    /// Configured discovery TTL, if any.
    #[must_use]
    pub fn discovery_ttl(&self) -> Option<Duration> {
        self.discovery_ttl_secs.map(Duration::from_secs)
    }

    /// Configured live-data TTL, if any.
    #[must_use]
    pub fn live_ttl(&self) -> Option<Duration> {
        self.live_ttl_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}
