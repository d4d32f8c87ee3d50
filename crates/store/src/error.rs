//! Error type for a single store node.
//!
//! Modeled as one `thiserror`-derived enum with an [`IntoResponse`] impl, the
//! same shape the rest of this workspace uses for request-path errors: every
//! fallible operation returns `Result<T, StoreError>` and the HTTP layer maps
//! variants to status codes in exactly one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Everything that can go wrong serving a store request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request body was missing a required field or was not valid JSON.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested key has no current value.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The log file could not be written. This is fatal to the request
    /// because durability is broken: the in-memory map must never diverge
    /// from what the log would replay.
    #[error("durability failure: {0}")]
    Durability(#[from] std::io::Error),
}

impl StoreError {
    /// Construct a [`StoreError::BadRequest`] from a message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Construct a [`StoreError::NotFound`] for `key`.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// True for errors that indicate the client sent a bad request, as
    /// opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadRequest(_) | Self::NotFound(_))
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Durability(_) => StatusCode::INTERNAL_SERVER_ERROR,
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
        let err = StoreError::bad_request("missing value");
        assert_eq!(err.to_string(), "bad request: missing value");
        assert!(err.is_client_error());
    }

    #[test]
    fn not_found_displays_key() {
        let err = StoreError::not_found("k1");
        assert_eq!(err.to_string(), "key not found: k1");
        assert!(err.is_client_error());
    }

    #[test]
    fn durability_error_is_not_a_client_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io_err);
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("durability failure"));
    }
}
