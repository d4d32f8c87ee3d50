//! Environment-derived configuration for a queue service process.

use counter_common::{ConfigError, EnvSource};
use std::time::Duration;

/// Everything a `queue-service` binary needs at startup.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// TCP port to bind the HTTP server on.
    pub port: u16,
    /// Primary store node base URLs, used to build the dispatch ring.
    pub store_nodes: Vec<String>,
    /// Capacity of the `MAIN` queue.
    pub max_queue_size: usize,
    /// Capacity of the `EXCESS` and `STALE` spillover queues.
    pub spillover_queue_size: usize,
    /// Per-key events admitted into `MAIN` directly within any 10s window.
    pub max_key_rate: usize,
    /// Age beyond which a `MAIN` job is sidelined into `STALE`.
    pub stale_threshold: Duration,
    /// Number of times a `STALE` job may be retried before being dropped.
    pub max_stale_retries: u8,
    /// Number of main worker tasks to spawn. `0` pauses dispatch entirely.
    pub worker_count: usize,
    /// Cap on distinct keys tracked in the rate-window table, enforced by
    /// the janitor (ambient addition; bounds memory for churning key spaces).
    pub max_tracked_keys: usize,
}

impl QueueConfig {
    /// Read configuration from the process environment, applying the
    /// defaults documented for each variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let stale_threshold_sec: u64 = EnvSource::parse_or("STALE_THRESHOLD_SEC", 5)?;
        Ok(Self {
            port: EnvSource::parse_or("QUEUE_PORT", 7000)?,
            store_nodes: EnvSource::comma_list("STORE_NODES"),
            max_queue_size: EnvSource::parse_or("MAX_QUEUE_SIZE", 100)?,
            spillover_queue_size: EnvSource::parse_or("SPILLOVER_QUEUE_SIZE", 100)?,
            max_key_rate: EnvSource::parse_or("MAX_KEY_RATE", 50)?,
            stale_threshold: Duration::from_secs(stale_threshold_sec),
            max_stale_retries: EnvSource::parse_or("MAX_STALE_RETRIES", 3)?,
            worker_count: EnvSource::parse_or("WORKER_COUNT", 1)?,
            max_tracked_keys: EnvSource::parse_or("MAX_TRACKED_KEYS", 10_000)?,
        })
    }
}
