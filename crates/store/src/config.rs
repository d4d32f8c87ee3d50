//! Environment-derived configuration for a store node process.

use counter_common::{ConfigError, EnvSource};
use std::path::PathBuf;

/// Everything a `store-node` binary needs at startup.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// TCP port to bind the HTTP server on.
    pub port: u16,
    /// Path to the append-only log file.
    pub log_path: PathBuf,
    /// Secondary node base URLs to fan replicated writes out to.
    pub secondaries: Vec<String>,
    /// Primary node base URL, if this node is a secondary. Its presence
    /// enables the reconcile loop.
    pub primary_url: Option<String>,
}

impl StoreConfig {
    /// Read configuration from the process environment, applying the
    /// defaults documented for each variable. Returns an error describing
    /// exactly which variable was invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: EnvSource::parse_or("STORE_PORT", 9000)?,
            log_path: PathBuf::from(EnvSource::string_or("LOG_PATH", "log.txt")),
            secondaries: EnvSource::comma_list("SECONDARIES"),
            primary_url: EnvSource::optional_string("PRIMARY_URL"),
        })
    }
}
