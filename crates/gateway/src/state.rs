//! Shared state for the gateway: the dispatch ring (shared in spirit with
//! the queue service — both are built from `STORE_NODES` and must therefore
//! agree on every key's owner), the primary→secondary pairing used for read
//! fallback, and the HTTP client used to reach both peers.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use counter_ring::HashRing;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct StoreReadResponse {
    value: String,
}

/// Everything the gateway needs to forward client requests to its peers.
/// Holds no admission control, replication, or storage logic of its own —
/// those live in [`counter_queue`] and [`counter_store`] respectively.
pub struct GatewayState {
    ring: HashRing,
    secondary_of: HashMap<String, String>,
    queue_url: String,
    http: reqwest::Client,
}

impl GatewayState {
    /// Build gateway state from `config`, pairing each primary with its
    /// index-aligned secondary.
    pub fn new(config: &GatewayConfig) -> Self {
        let ring = HashRing::build(&config.store_nodes, counter_ring::DEFAULT_REPLICAS);
        let secondary_of = config
            .store_nodes
            .iter()
            .cloned()
            .zip(config.store_secondaries.iter().cloned())
            .collect();
        Self {
            ring,
            secondary_of,
            queue_url: config.queue_url.clone(),
            http: counter_common::http_client(),
        }
    }

    /// Base URL of the queue service's `/enqueue` endpoint.
    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    /// The HTTP client shared by every outbound call this gateway makes.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Read `key`'s value from its owning primary, falling back once to the
    /// paired secondary on a transport error (e.g. connection refused).
    /// Returns `Ok(None)` for a genuine 404 from whichever node answered —
    /// callers map that to the gateway's "unknown keys read as 0" contract.
    pub async fn read_value(&self, key: &str) -> Result<Option<String>, GatewayError> {
        let primary = self.ring.lookup(key).ok_or(GatewayError::Unavailable)?;

        if let Ok(outcome) = self.fetch(primary, key).await {
            return Ok(outcome);
        }

        let secondary = self.secondary_of.get(primary).ok_or(GatewayError::Unavailable)?;
        self.fetch(secondary, key).await.map_err(|()| GatewayError::Unavailable)
    }

    /// `Ok(Some(value))` on 200, `Ok(None)` on 404, `Err(())` on transport
    /// failure or any other status — the caller decides whether to retry.
    async fn fetch(&self, node: &str, key: &str) -> Result<Option<String>, ()> {
        let url = format!("{}/store/{}", node.trim_end_matches('/'), key);
        let response = self.http.get(&url).send().await.map_err(|_| ())?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let parsed: StoreReadResponse = response.json().await.map_err(|_| ())?;
                Ok(Some(parsed.value))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            _ => Err(()),
        }
    }
}
