//! The unit of work moving between `MAIN`, `EXCESS` and `STALE`.

use std::time::Instant;

/// A queued increment job. Created on successful enqueue, moved between
/// queues, and destroyed on successful application or when its retry budget
/// is exhausted.
#[derive(Debug, Clone)]
pub struct Job {
    /// The counter key to increment.
    pub key: String,
    /// Monotonic enqueue time, used to compute staleness.
    pub timestamp: Instant,
    /// Number of times this job has been retried from `STALE`.
    pub retries: u8,
}

impl Job {
    /// Create a freshly-enqueued job stamped with the current time.
    pub fn new(key: String) -> Self {
        Self {
            key,
            timestamp: Instant::now(),
            retries: 0,
        }
    }

    /// How long ago this job was originally enqueued.
    pub fn age(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }
}
