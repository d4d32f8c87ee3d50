//! Asynchronous fan-out of primary writes to configured secondaries.
//!
//! One bounded FIFO channel and one dedicated sender task per secondary:
//! this preserves per-secondary ordering by construction, which a
//! thread/task-per-event fan-out cannot guarantee under load. Reconciliation
//! (see [`crate::reconcile`]) is the safety net for whatever drift still
//! slips through — a dropped message on a full channel, a transport
//! failure, a missed process restart.

use std::sync::Arc;
use tokio::sync::mpsc;

/// Bound on how many pending replicated writes a secondary's channel will
/// hold before new writes are dropped rather than queued. A slow or
/// unreachable secondary must never cause the primary's request path to
/// block or grow memory without limit.
const CHANNEL_CAPACITY: usize = 1024;

/// A replicated mutation queued for a single secondary.
#[derive(Debug, Clone)]
pub struct ReplicatedWrite {
    pub key: String,
    pub value: String,
}

/// A handle to one secondary's dedicated sender task.
pub struct SecondaryHandle {
    url: String,
    tx: mpsc::Sender<ReplicatedWrite>,
}

impl SecondaryHandle {
    /// Spawn the sender task for `url` and return a handle to enqueue
    /// writes onto it.
    pub fn spawn(url: String, client: reqwest::Client) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(sender_loop(url.clone(), client, rx));
        Self { url, tx }
    }

    /// Enqueue a write for this secondary. Non-blocking: if the channel is
    /// full the write is dropped and logged rather than backing up the
    /// primary's request path.
    pub fn enqueue(&self, write: ReplicatedWrite) {
        if self.tx.try_send(write).is_err() {
            tracing::warn!(url = %self.url, "replication channel full or closed, dropping write");
        }
    }
}

async fn sender_loop(url: String, client: reqwest::Client, mut rx: mpsc::Receiver<ReplicatedWrite>) {
    while let Some(write) = rx.recv().await {
        let endpoint = format!("{}/store/{}", url.trim_end_matches('/'), write.key);
        let result = client
            .post(&endpoint)
            .json(&serde_json::json!({ "value": write.value }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(url = %url, key = %write.key, status = %resp.status(), "replication rejected by secondary");
            }
            Err(err) => {
                tracing::warn!(url = %url, key = %write.key, error = %err, "replication request failed");
            }
        }
    }
}

/// Spawn one [`SecondaryHandle`] per configured secondary URL.
pub fn spawn_all(urls: &[String], client: &reqwest::Client) -> Vec<Arc<SecondaryHandle>> {
    urls.iter()
        .map(|url| Arc::new(SecondaryHandle::spawn(url.clone(), client.clone())))
        .collect()
}
