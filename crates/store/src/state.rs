//! Shared, lockable state owned by a single store node.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::log::{self, TOMBSTONE};
use crate::replication::{ReplicatedWrite, SecondaryHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::sync::Arc;

struct Inner {
    map: HashMap<String, String>,
    log_file: File,
}

/// One shard's worth of state: the in-memory map, its log file, and the
/// peers it talks to. All map+log mutations happen under `SLOCK`
/// (`parking_lot::Mutex`); replication is dispatched after the lock is
/// released.
pub struct StoreState {
    inner: Mutex<Inner>,
    secondaries: Vec<Arc<SecondaryHandle>>,
    primary_url: Option<String>,
    http: reqwest::Client,
}

impl StoreState {
    /// Replay the configured log file, open it for append, and spawn a
    /// sender task per secondary. Fails only if the log file cannot be
    /// opened or replayed, which is fatal for the owning process.
    pub fn open(config: &StoreConfig) -> std::io::Result<Arc<Self>> {
        let map = log::replay(&config.log_path)?;
        let log_file = log::open_for_append(&config.log_path)?;
        let http = counter_common::http_client();
        let secondaries = crate::replication::spawn_all(&config.secondaries, &http);

        Ok(Arc::new(Self {
            inner: Mutex::new(Inner { map, log_file }),
            secondaries,
            primary_url: config.primary_url.clone(),
            http,
        }))
    }

    /// Primary URL this node reconciles against, if it is a secondary.
    pub fn primary_url(&self) -> Option<&str> {
        self.primary_url.as_deref()
    }

    /// The HTTP client shared by the reconcile loop and any caller needing
    /// to talk to peers.
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// Replace `key`'s value, durably, and fan the write out to secondaries.
    pub fn put(&self, key: &str, value: &str) -> Result<String, StoreError> {
        {
            let mut inner = self.inner.lock();
            log::append_record(&mut inner.log_file, key, value)?;
            inner.map.insert(key.to_string(), value.to_string());
        }
        self.replicate(key, value);
        Ok(value.to_string())
    }

    /// Atomically read-modify-write `key`'s value by +1, treating an absent
    /// key as 0, and fan the new value out to secondaries.
    pub fn increment(&self, key: &str) -> Result<String, StoreError> {
        let new_value = {
            let mut inner = self.inner.lock();
            let current: u64 = inner
                .map
                .get(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let new_value = current + 1;
            let new_value_str = new_value.to_string();
            log::append_record(&mut inner.log_file, key, &new_value_str)?;
            inner.map.insert(key.to_string(), new_value_str.clone());
            new_value_str
        };
        self.replicate(key, &new_value);
        Ok(new_value)
    }

    /// Current value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().map.get(key).cloned()
    }

    /// Remove `key`, appending a tombstone record, and fan the deletion out
    /// to secondaries. Returns [`StoreError::NotFound`] if `key` was absent.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock();
            if inner.map.remove(key).is_none() {
                return Err(StoreError::not_found(key));
            }
            log::append_record(&mut inner.log_file, key, TOMBSTONE)?;
        }
        self.replicate(key, TOMBSTONE);
        Ok(())
    }

    /// Snapshot of every key currently known locally, used by the reconcile
    /// loop to decide what to pull from the primary.
    pub fn keys_snapshot(&self) -> Vec<String> {
        self.inner.lock().map.keys().cloned().collect()
    }

    /// Apply a value learned from the primary during reconciliation, but
    /// only if it is strictly greater than the current local value (or the
    /// tombstone semantics below), preserving the monotone-max invariant.
    /// Returns `true` if the local state changed.
    pub fn apply_if_greater(&self, key: &str, candidate: &str) -> Result<bool, StoreError> {
        let Ok(candidate_n) = candidate.parse::<u64>() else {
            return Ok(false);
        };
        let mut inner = self.inner.lock();
        let current: u64 = inner
            .map
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if candidate_n <= current {
            return Ok(false);
        }
        log::append_record(&mut inner.log_file, key, candidate)?;
        inner.map.insert(key.to_string(), candidate.to_string());
        Ok(true)
    }

    fn replicate(&self, key: &str, value: &str) {
        for secondary in &self.secondaries {
            secondary.enqueue(ReplicatedWrite {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> StoreConfig {
        StoreConfig {
            port: 0,
            log_path: dir.join("log.txt"),
            secondaries: vec![],
            primary_url: None,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let state = StoreState::open(&test_config(dir.path())).unwrap();
        state.put("k", "5").unwrap();
        assert_eq!(state.get("k"), Some("5".to_string()));
    }

    #[test]
    fn increment_defaults_absent_key_to_zero() {
        let dir = tempdir().unwrap();
        let state = StoreState::open(&test_config(dir.path())).unwrap();
        assert_eq!(state.increment("k").unwrap(), "1");
        assert_eq!(state.increment("k").unwrap(), "2");
        assert_eq!(state.increment("k").unwrap(), "3");
    }

    #[test]
    fn delete_removes_key_and_errors_if_absent() {
        let dir = tempdir().unwrap();
        let state = StoreState::open(&test_config(dir.path())).unwrap();
        state.put("k", "1").unwrap();
        state.delete("k").unwrap();
        assert_eq!(state.get("k"), None);
        assert!(matches!(state.delete("k"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn log_replay_reconstructs_state_after_restart() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        {
            let state = StoreState::open(&config).unwrap();
            state.put("a", "1").unwrap();
            state.increment("a").unwrap();
            state.put("b", "9").unwrap();
            state.delete("b").unwrap();
        }
        let restarted = StoreState::open(&config).unwrap();
        assert_eq!(restarted.get("a"), Some("2".to_string()));
        assert_eq!(restarted.get("b"), None);
    }

    #[test]
    fn concurrent_increments_sum_exactly() {
        let dir = tempdir().unwrap();
        let state = StoreState::open(&test_config(dir.path())).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let state = &state;
                scope.spawn(move || {
                    for _ in 0..25 {
                        state.increment("shared").unwrap();
                    }
                });
            }
        });
        assert_eq!(state.get("shared"), Some("200".to_string()));
    }

    #[test]
    fn apply_if_greater_is_monotone() {
        let dir = tempdir().unwrap();
        let state = StoreState::open(&test_config(dir.path())).unwrap();
        state.put("k", "5").unwrap();

        assert!(!state.apply_if_greater("k", "3").unwrap());
        assert_eq!(state.get("k"), Some("5".to_string()));

        assert!(state.apply_if_greater("k", "10").unwrap());
        assert_eq!(state.get("k"), Some("10".to_string()));
    }
}
