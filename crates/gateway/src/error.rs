//! Error type for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Everything that can go wrong serving a gateway request. The gateway
/// forwards enqueue bodies verbatim and never inspects them, so it has no
/// bad-request variant of its own — `/enqueue` validation happens entirely
/// on the queue service and is relayed back through its status code.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Both the primary and its paired secondary failed to answer a read.
    #[error("no store node available for this key")]
    Unavailable,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
