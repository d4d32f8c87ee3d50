//! HTTP surface for the gateway: enqueue passthrough, read fallback, and
//! health. No admission control, rate limiting, or storage logic belongs
//! here — this mirrors the thin two-route stub it is grounded on.

use crate::error::GatewayError;
use crate::state::GatewayState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the Axum router for the gateway, with `state` wired into every
/// handler via `with_state`.
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/enqueue", post(enqueue))
        .route("/counter/:key", get(read_counter))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Forward the request body verbatim to the queue service and relay its
/// status code and body back to the client.
async fn enqueue(State(state): State<Arc<GatewayState>>, body: axum::body::Bytes) -> axum::response::Response {
    let url = format!("{}/enqueue", state.queue_url().trim_end_matches('/'));
    let upstream = state
        .http_client()
        .post(&url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let body = response.bytes().await.unwrap_or_default();
            (status, body).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "enqueue passthrough to queue service failed");
            GatewayError::Unavailable.into_response()
        }
    }
}

async fn read_counter(
    State(state): State<Arc<GatewayState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    match state.read_value(&key).await? {
        Some(value) => Ok(Json(json!({ "key": key, "value": value }))),
        None => Ok(Json(json!({ "key": key, "value": "0" }))),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "gateway up" }))
}
