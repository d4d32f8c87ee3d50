//! The gateway: the thin, intentionally logic-free HTTP front door that
//! forwards client writes to the queue service and client reads to the
//! owning store node (with one fallback to its paired secondary).
//!
//! Everything interesting in this system — admission control, replication,
//! reconciliation, routing — lives in [`counter_queue`] and [`counter_store`].
//! This crate exists only so the scenarios described alongside it are
//! runnable against real processes.

pub mod config;
pub mod error;
pub mod http;
pub mod state;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use state::GatewayState;
