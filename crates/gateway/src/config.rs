//! Environment-derived configuration for the gateway process.

use counter_common::{ConfigError, EnvSource};

/// Everything a `gateway` binary needs at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// TCP port to bind the HTTP server on.
    pub port: u16,
    /// Primary store node base URLs, in ring-build order.
    pub store_nodes: Vec<String>,
    /// Secondary store node base URLs, index-aligned with `store_nodes`.
    pub store_secondaries: Vec<String>,
    /// Base URL of the queue service's `/enqueue` endpoint.
    pub queue_url: String,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: EnvSource::parse_or("GATEWAY_PORT", 8000)?,
            store_nodes: EnvSource::comma_list("STORE_NODES"),
            store_secondaries: EnvSource::comma_list("STORE_SECONDARIES"),
            queue_url: EnvSource::string_or("QUEUE_URL", "http://localhost:7000"),
        })
    }
}
