//! `queue-service` binary: admission control and dispatch for increment
//! jobs, served over HTTP.
//!
//! Spawns `WORKER_COUNT` main workers (zero pauses dispatch entirely,
//! letting `MAIN` fill up and 429 — used to exercise back-pressure
//! deterministically), one excess worker, one stale worker, and the
//! rate-window janitor.

use counter_queue::{QueueConfig, QueueState};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    counter_common::init_tracing("queue-service");

    let config = match QueueConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(QueueState::new(config));

    for _ in 0..state.config().worker_count {
        let worker_state = state.clone();
        tokio::spawn(counter_queue::workers::main_worker_loop(worker_state));
    }
    tokio::spawn(counter_queue::workers::excess_worker_loop(state.clone()));
    tokio::spawn(counter_queue::workers::stale_worker_loop(state.clone()));
    tokio::spawn(counter_queue::workers::janitor_loop(state.clone()));

    let app = counter_queue::http::router(state.clone());
    let addr = format!("0.0.0.0:{}", state.config().port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr, workers = state.config().worker_count, "queue-service listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server exited with error");
                return ExitCode::FAILURE;
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    ExitCode::SUCCESS
}
