//! The queue service: admission control, per-key rate limiting, age-based
//! sidelining, and ordered-enough dispatch of increment jobs to store nodes
//! through the consistent-hash ring.
//!
//! This crate owns no storage state of its own — it is the QS leaf of the
//! system, talking to store nodes purely over the HTTP contract in
//! [`counter_store::http`] (mirrored here by [`state::QueueState::dispatch`]).

pub mod config;
pub mod error;
pub mod http;
pub mod job;
pub mod state;
pub mod workers;

pub use config::QueueConfig;
pub use error::QueueError;
pub use job::Job;
pub use state::QueueState;
