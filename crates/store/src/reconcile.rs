//! Periodic secondary→primary reconciliation.
//!
//! Values are monotone counters, so pulling the primary's value and keeping
//! it only when it is strictly greater is always safe — there is no
//! conflict to resolve, only drift to erase. This is the safety net for
//! whatever replication misses: a dropped channel write, a transport
//! failure, a secondary that was offline when a mutation happened.

use crate::state::StoreState;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Interval between reconciliation passes.
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct StoreReadResponse {
    value: String,
}

/// Run the reconcile loop forever, waking every [`RECONCILE_INTERVAL`] and
/// pulling each locally-known key from `primary_url`. Intended to be spawned
/// as a daemon task; it never returns.
pub async fn reconcile_loop(state: Arc<StoreState>, primary_url: String) {
    let client = state.http_client();
    loop {
        tokio::time::sleep(RECONCILE_INTERVAL).await;
        reconcile_once(&state, &primary_url, &client).await;
    }
}

/// Run a single reconciliation pass against `primary_url`. Exposed
/// separately from the loop so tests can single-step it deterministically
/// instead of racing a background timer.
pub async fn reconcile_once(state: &Arc<StoreState>, primary_url: &str, client: &reqwest::Client) {
    for key in state.keys_snapshot() {
        let url = format!("{}/store/{}", primary_url.trim_end_matches('/'), key);
        let response = match client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(url = %url, key = %key, error = %err, "reconcile request failed");
                continue;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(url = %url, key = %key, status = %response.status(), "reconcile got non-200 from primary");
            continue;
        }

        let parsed: StoreReadResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(url = %url, key = %key, error = %err, "reconcile got unparsable body from primary");
                continue;
            }
        };

        match state.apply_if_greater(&key, &parsed.value) {
            Ok(true) => tracing::debug!(key = %key, value = %parsed.value, "reconciled key from primary"),
            Ok(false) => {}
            Err(err) => tracing::warn!(key = %key, error = %err, "reconcile write failed"),
        }
    }
}
