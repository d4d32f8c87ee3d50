//! Shared plumbing for the counter service binaries.
//!
//! Every binary in this workspace (`store-node`, `queue-service`, `gateway`)
//! reads its configuration from the environment the same way, initializes
//! `tracing` the same way, and talks to its peers over HTTP with the same
//! fixed deadline. That shared ambient behavior lives here so it is
//! implemented once instead of copy-pasted into each binary.

pub mod config;
pub mod http;
pub mod logging;

pub use config::{ConfigError, EnvSource};
pub use http::{http_client, REQUEST_DEADLINE};
pub use logging::init_tracing;
