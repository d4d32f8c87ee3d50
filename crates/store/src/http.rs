//! HTTP surface for a store node: the four `/store/<key>` operations plus
//! `/health`, wired onto [`StoreState`] through Axum's `State` extractor.

use crate::error::StoreError;
use crate::state::StoreState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the Axum router for a store node, with `state` wired into every
/// handler via `with_state`.
pub fn router(state: Arc<StoreState>) -> Router {
    Router::new()
        .route("/store/:key", get(get_key).post(put_key).delete(delete_key))
        .route("/store/:key/increment", post(increment_key))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PutBody {
    value: Option<String>,
}

async fn get_key(State(state): State<Arc<StoreState>>, Path(key): Path<String>) -> axum::response::Response {
    match state.get(&key) {
        Some(value) => (StatusCode::OK, Json(json!({ "key": key, "value": value }))).into_response(),
        None => StoreError::not_found(key).into_response(),
    }
}

async fn put_key(
    State(state): State<Arc<StoreState>>,
    Path(key): Path<String>,
    body: axum::body::Bytes,
) -> Result<axum::response::Response, StoreError> {
    let parsed: PutBody = serde_json::from_slice(&body)
        .map_err(|e| StoreError::bad_request(format!("invalid JSON body: {e}")))?;
    let value = parsed
        .value
        .ok_or_else(|| StoreError::bad_request("missing 'value' field"))?;

    let stored = state.put(&key, &value)?;
    Ok((StatusCode::CREATED, Json(json!({ "key": key, "value": stored }))).into_response())
}

async fn increment_key(
    State(state): State<Arc<StoreState>>,
    Path(key): Path<String>,
) -> Result<axum::response::Response, StoreError> {
    let new_value = state.increment(&key)?;
    Ok((StatusCode::CREATED, Json(json!({ "key": key, "value": new_value }))).into_response())
}

async fn delete_key(
    State(state): State<Arc<StoreState>>,
    Path(key): Path<String>,
) -> Result<StatusCode, StoreError> {
    state.delete(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "store up" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path) -> Arc<StoreState> {
        let config = StoreConfig {
            port: 0,
            log_path: dir.join("log.txt"),
            secondaries: vec![],
            primary_url: None,
        };
        StoreState::open(&config).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trips_over_http() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let put_req = Request::post("/store/k")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"value":"5"}"#))
            .unwrap();
        let put_resp = app.clone().oneshot(put_req).await.unwrap();
        assert_eq!(put_resp.status(), StatusCode::CREATED);

        let get_req = Request::get("/store/k").body(Body::empty()).unwrap();
        let get_resp = app.oneshot(get_req).await.unwrap();
        assert_eq!(get_resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_missing_key_is_404() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));
        let req = Request::get("/store/missing").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_missing_value_is_400() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));
        let req = Request::post("/store/k")
            .header("content-type", "application/json")
            .body(Body::from(r#"{}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn increment_creates_then_advances() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));

        for expected in ["1", "2", "3"] {
            let req = Request::post("/store/counter/increment").body(Body::empty()).unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(parsed["value"], expected);
        }
    }

    #[tokio::test]
    async fn delete_missing_key_is_404() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));
        let req = Request::delete("/store/missing").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let put_req = Request::post("/store/k")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"value":"1"}"#))
            .unwrap();
        app.clone().oneshot(put_req).await.unwrap();

        let del_req = Request::delete("/store/k").body(Body::empty()).unwrap();
        let del_resp = app.clone().oneshot(del_req).await.unwrap();
        assert_eq!(del_resp.status(), StatusCode::NO_CONTENT);

        let get_req = Request::get("/store/k").body(Body::empty()).unwrap();
        let get_resp = app.oneshot(get_req).await.unwrap();
        assert_eq!(get_resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_up() {
        let dir = tempdir().unwrap();
        let app = router(test_state(dir.path()));
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
