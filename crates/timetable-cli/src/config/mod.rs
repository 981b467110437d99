//! Application configuration module.
//!
//! Manages the TOML config file holding portal connection and cache
//! settings.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, CacheConfig, PortalConfig};
pub use paths::resolve_config_path;
