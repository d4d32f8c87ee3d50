//! HTTP surface for the queue service: `POST /enqueue` and `/health`.

use crate::error::QueueError;
use crate::state::{EnqueueStatus, QueueState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the Axum router for a queue service, with `state` wired into every
/// handler via `with_state`.
pub fn router(state: Arc<QueueState>) -> Router {
    Router::new()
        .route("/enqueue", post(enqueue))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EnqueueBody {
    action: Option<String>,
    key: Option<String>,
}

async fn enqueue(State(state): State<Arc<QueueState>>, body: axum::body::Bytes) -> axum::response::Response {
    let Ok(body) = serde_json::from_slice::<EnqueueBody>(&body) else {
        return QueueError::bad_request("missing or invalid JSON body").into_response();
    };
    let (Some(action), Some(key)) = (body.action, body.key) else {
        return QueueError::bad_request("'action' and 'key' are required").into_response();
    };
    if action != "increment" {
        return QueueError::bad_request(format!("unsupported action {action:?}")).into_response();
    }
    if key.is_empty() {
        return QueueError::bad_request("'key' must not be empty").into_response();
    }

    match state.try_enqueue(key) {
        Ok(EnqueueStatus::Enqueued) => {
            (StatusCode::ACCEPTED, Json(json!({ "status": "enqueued" }))).into_response()
        }
        Ok(EnqueueStatus::SidelinedRate) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "sidelined:rate" })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "queue up" }))
}
