//! End-to-end test driving a queue's admission and worker step functions
//! against a real store node over HTTP.

use counter_queue::state::EnqueueStatus;
use counter_queue::workers::step_main_job;
use counter_queue::{QueueConfig, QueueState};
use counter_store::{StoreConfig, StoreState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

async fn spawn_store_node() -> std::net::SocketAddr {
    let dir = tempdir().unwrap();
    let config = StoreConfig {
        port: 0,
        log_path: dir.path().join("log.txt"),
        secondaries: vec![],
        primary_url: None,
    };
    // Leak the tempdir so the log file outlives the spawned server for the
    // duration of the test process.
    std::mem::forget(dir);
    let state = StoreState::open(&config).unwrap();
    let app = counter_store::http::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn enqueued_jobs_drain_to_the_owning_store_node_in_order() {
    let node_addr = spawn_store_node().await;
    let state = Arc::new(QueueState::new(QueueConfig {
        port: 0,
        store_nodes: vec![format!("http://{node_addr}")],
        max_queue_size: 100,
        spillover_queue_size: 100,
        max_key_rate: 50,
        stale_threshold: Duration::from_secs(5),
        max_stale_retries: 3,
        worker_count: 1,
        max_tracked_keys: 10_000,
    }));

    for _ in 0..3 {
        assert_eq!(state.try_enqueue("x".to_string()).unwrap(), EnqueueStatus::Enqueued);
    }

    while let Some(job) = state.pop_main() {
        step_main_job(&state, job).await;
    }

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{node_addr}/store/x"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["value"], "3");
}
