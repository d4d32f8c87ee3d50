//! Error type for the queue service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Everything that can go wrong admitting or dispatching a job.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The enqueue request body was missing a required field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// `MAIN` (or `EXCESS`, for a rate-limited job) had no room left.
    #[error("queue full")]
    Overloaded,

    /// A store node returned a non-success status while dispatching a job.
    /// Never surfaced to an enqueue caller; logged by the worker that hit it.
    #[error("upstream store error: {0}")]
    Upstream(String),

    /// A store node could not be reached while dispatching a job. Never
    /// surfaced to an enqueue caller; logged by the worker that hit it.
    #[error("transport error: {0}")]
    Transport(String),
}

impl QueueError {
    /// Construct a [`QueueError::BadRequest`] from a message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        let status = match &self {
            QueueError::BadRequest(_) => StatusCode::BAD_REQUEST,
            QueueError::Overloaded => StatusCode::TOO_MANY_REQUESTS,
            QueueError::Upstream(_) | QueueError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_displays_message() {
        let err = QueueError::bad_request("missing key");
        assert_eq!(err.to_string(), "bad request: missing key");
    }
}
