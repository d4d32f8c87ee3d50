//! HTTP client construction shared by every outbound call in this system.
//!
//! Every outbound request this system makes — store to secondary, secondary
//! to primary, queue worker to store, gateway to store/queue — uses the same
//! fixed 1-second deadline. Centralizing the client builder means that
//! deadline can't silently drift between call sites.

use std::time::Duration;

/// The fixed per-request deadline used for every outbound call this system
/// makes to a peer service.
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(1);

/// Build a [`reqwest::Client`] with the system-wide request deadline baked
/// in. Panics only if the underlying TLS backend fails to initialize, which
/// would indicate a broken build environment rather than a recoverable
/// runtime condition.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_DEADLINE)
        .build()
        .expect("failed to construct HTTP client")
}
