//! `store-node` binary: a single-shard counter store served over HTTP.
//!
//! Opens and replays its log, starts serving, and — if `PRIMARY_URL` is set —
//! spawns the background reconcile loop against that primary.

use counter_store::{StoreConfig, StoreState};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    counter_common::init_tracing("store-node");

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let state = match StoreState::open(&config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, log_path = %config.log_path.display(), "failed to open log, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    if let Some(primary_url) = state.primary_url().map(str::to_owned) {
        let reconcile_state = state.clone();
        tokio::spawn(async move {
            counter_store::reconcile::reconcile_loop(reconcile_state, primary_url).await;
        });
    }

    let app = counter_store::http::router(state);
    let addr = format!("0.0.0.0:{}", config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr, "store-node listening");

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
