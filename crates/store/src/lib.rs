//! A single-shard, log-backed counter store: atomic `PUT`/`INC`/`GET`/`DEL`,
//! asynchronous fan-out replication to secondaries, and periodic
//! reconciliation when configured as a secondary itself.
//!
//! This crate owns none of the ring or queueing logic — it is the SN leaf of
//! the system, reachable only through the HTTP contract in [`http`].

pub mod config;
pub mod error;
pub mod http;
pub mod log;
pub mod reconcile;
pub mod replication;
pub mod state;

pub use config::StoreConfig;
pub use error::StoreError;
pub use state::StoreState;
