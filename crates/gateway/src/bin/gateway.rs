//! `gateway` binary: the client-facing front door. Forwards `/enqueue` to
//! the queue service and `/counter/<key>` reads to the owning store node,
//! with one fallback to its paired secondary.

use counter_gateway::{GatewayConfig, GatewayState};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    counter_common::init_tracing("gateway");

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(GatewayState::new(&config));
    let app = counter_gateway::http::router(state);
    let addr = format!("0.0.0.0:{}", config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr, "gateway listening");

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
