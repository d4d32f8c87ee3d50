//! Shared, lockable state owned by a queue service: the three bounded FIFO
//! queues, the per-key rate-window table, and the dispatch ring.

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::job::Job;
use counter_ring::HashRing;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Sliding window used for the per-key rate limit.
const RATE_WINDOW: Duration = Duration::from_secs(10);

/// Outcome of a successful admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueStatus {
    /// Accepted directly into `MAIN`.
    Enqueued,
    /// Diverted to `EXCESS` because the key exceeded `MAX_KEY_RATE`.
    SidelinedRate,
}

struct KeyWindow {
    timestamps: VecDeque<Instant>,
    last_touched: Instant,
}

struct Inner {
    main: VecDeque<Job>,
    excess: VecDeque<Job>,
    stale: VecDeque<Job>,
    windows: HashMap<String, KeyWindow>,
}

/// All mutable state for one queue service instance, guarded by a single
/// `QLOCK` (`parking_lot::Mutex`) covering the queues and the rate-window
/// table as one atomic group. Network I/O (dispatch to a store node) always
/// happens outside this lock.
pub struct QueueState {
    inner: Mutex<Inner>,
    config: QueueConfig,
    ring: HashRing,
    http: reqwest::Client,
}

impl QueueState {
    /// Build a fresh, empty queue state from `config`, constructing the
    /// dispatch ring from its configured store nodes.
    pub fn new(config: QueueConfig) -> Self {
        let ring = HashRing::build(&config.store_nodes, counter_ring::DEFAULT_REPLICAS);
        Self {
            inner: Mutex::new(Inner {
                main: VecDeque::new(),
                excess: VecDeque::new(),
                stale: VecDeque::new(),
                windows: HashMap::new(),
            }),
            config,
            ring,
            http: counter_common::http_client(),
        }
    }

    /// Configuration this instance was built from.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Current `(main, excess, stale)` queue lengths. Exposed for tests and
    /// observability; never used to gate admission decisions beyond the
    /// lock-held checks inside [`Self::try_enqueue`].
    pub fn queue_lengths(&self) -> (usize, usize, usize) {
        let inner = self.inner.lock();
        (inner.main.len(), inner.excess.len(), inner.stale.len())
    }

    /// Number of distinct keys currently tracked in the rate-window table.
    pub fn tracked_key_count(&self) -> usize {
        self.inner.lock().windows.len()
    }

    /// Admission path: validate the per-key rate window, then place the job
    /// into `EXCESS` (rate-limited) or `MAIN`, or reject with
    /// [`QueueError::Overloaded`]. The per-key window only admits this
    /// request's timestamp when the job is actually accepted; an outright
    /// 429 never counts toward the window.
    pub fn try_enqueue(&self, key: String) -> Result<EnqueueStatus, QueueError> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let window = inner.windows.entry(key.clone()).or_insert_with(|| KeyWindow {
            timestamps: VecDeque::new(),
            last_touched: now,
        });
        while let Some(&front) = window.timestamps.front() {
            if now.duration_since(front) > RATE_WINDOW {
                window.timestamps.pop_front();
            } else {
                break;
            }
        }
        let rate_limited = window.timestamps.len() > self.config.max_key_rate;

        if rate_limited {
            if inner.excess.len() >= self.config.spillover_queue_size {
                return Err(QueueError::Overloaded);
            }
            inner.excess.push_back(Job::new(key.clone()));
        } else {
            if inner.main.len() >= self.config.max_queue_size {
                return Err(QueueError::Overloaded);
            }
            inner.main.push_back(Job::new(key.clone()));
        }

        let window = inner.windows.get_mut(&key).expect("window inserted above");
        window.timestamps.push_back(now);
        window.last_touched = now;

        Ok(if rate_limited {
            EnqueueStatus::SidelinedRate
        } else {
            EnqueueStatus::Enqueued
        })
    }

    /// Pop the head of `MAIN`, or `None` if empty. Called by a main worker
    /// under the lock; the caller must release the lock before any network
    /// I/O.
    pub fn pop_main(&self) -> Option<Job> {
        self.inner.lock().main.pop_front()
    }

    /// True if `job` has aged past `STALE_THRESHOLD_SEC`.
    pub fn is_stale(&self, job: &Job) -> bool {
        job.age() > self.config.stale_threshold
    }

    /// Move `job` into `STALE`, or drop it with a warning if `STALE` is
    /// already at capacity.
    pub fn sideline_stale(&self, job: Job) {
        let mut inner = self.inner.lock();
        if inner.stale.len() >= self.config.spillover_queue_size {
            tracing::warn!(key = %job.key, "STALE queue full, dropping aged job");
            return;
        }
        inner.stale.push_back(job);
    }

    /// Pop the head of `STALE`, or `None` if empty.
    pub fn pop_stale(&self) -> Option<Job> {
        self.inner.lock().stale.pop_front()
    }

    /// If `MAIN` has room and `EXCESS` is non-empty, move one job from the
    /// head of `EXCESS` to the tail of `MAIN`. Returns `true` if a job was
    /// moved.
    pub fn promote_excess_to_main(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.main.len() >= self.config.max_queue_size {
            return false;
        }
        match inner.excess.pop_front() {
            Some(job) => {
                inner.main.push_back(job);
                true
            }
            None => false,
        }
    }

    /// Janitor sweep: drop rate-window entries for keys whose most recent
    /// timestamp fell outside the window, then evict least-recently-touched
    /// entries until at most `MAX_TRACKED_KEYS` remain. Never affects
    /// admission decisions for a key that enqueues again — a fresh window is
    /// created on demand.
    pub fn run_janitor(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        inner
            .windows
            .retain(|_, window| now.duration_since(window.last_touched) <= RATE_WINDOW);

        let max_tracked = self.config.max_tracked_keys;
        if inner.windows.len() > max_tracked {
            let mut by_last_touched: Vec<(String, Instant)> = inner
                .windows
                .iter()
                .map(|(key, window)| (key.clone(), window.last_touched))
                .collect();
            by_last_touched.sort_by_key(|(_, last_touched)| *last_touched);
            let evict_count = inner.windows.len() - max_tracked;
            for (key, _) in by_last_touched.into_iter().take(evict_count) {
                inner.windows.remove(&key);
            }
        }
    }

    /// Apply `job`: look it up on the ring and issue the increment against
    /// its owning store node. Errors are returned for the caller to log;
    /// they are never surfaced to the original enqueue caller.
    pub async fn dispatch(&self, job: &Job) -> Result<String, QueueError> {
        let node = self
            .ring
            .lookup(&job.key)
            .ok_or_else(|| QueueError::Upstream("no store nodes configured".to_string()))?;
        let endpoint = format!("{}/store/{}/increment", node.trim_end_matches('/'), job.key);

        let response = self
            .http
            .post(&endpoint)
            .send()
            .await
            .map_err(|e| QueueError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(QueueError::Upstream(format!(
                "store node returned {}",
                response.status()
            )));
        }
        Ok(response.status().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> QueueConfig {
        QueueConfig {
            port: 0,
            store_nodes: vec!["http://node-a".to_string()],
            max_queue_size: 100,
            spillover_queue_size: 100,
            max_key_rate: 50,
            stale_threshold: Duration::from_secs(5),
            max_stale_retries: 3,
            worker_count: 1,
            max_tracked_keys: 10_000,
        }
    }

    #[test]
    fn enqueue_accepts_into_main_below_rate_limit() {
        let state = QueueState::new(test_config());
        for _ in 0..51 {
            assert_eq!(state.try_enqueue("x".to_string()).unwrap(), EnqueueStatus::Enqueued);
        }
        let (main, excess, _) = state.queue_lengths();
        assert_eq!(main, 51);
        assert_eq!(excess, 0);
    }

    #[test]
    fn enqueue_sidelines_past_rate_limit_then_429s_when_excess_full() {
        let mut config = test_config();
        config.spillover_queue_size = 3;
        let state = QueueState::new(config);

        for _ in 0..51 {
            state.try_enqueue("x".to_string()).unwrap();
        }
        for _ in 0..3 {
            assert_eq!(
                state.try_enqueue("x".to_string()).unwrap(),
                EnqueueStatus::SidelinedRate
            );
        }
        assert!(matches!(
            state.try_enqueue("x".to_string()),
            Err(QueueError::Overloaded)
        ));
        let (main, excess, _) = state.queue_lengths();
        assert_eq!(main, 51);
        assert_eq!(excess, 3);
    }

    #[test]
    fn main_full_rejects_with_429() {
        let mut config = test_config();
        config.max_queue_size = 2;
        let state = QueueState::new(config);

        assert_eq!(state.try_enqueue("a".to_string()).unwrap(), EnqueueStatus::Enqueued);
        assert_eq!(state.try_enqueue("b".to_string()).unwrap(), EnqueueStatus::Enqueued);
        assert!(matches!(
            state.try_enqueue("c".to_string()),
            Err(QueueError::Overloaded)
        ));
        let (main, _, _) = state.queue_lengths();
        assert_eq!(main, 2);
    }

    #[test]
    fn rejected_429_does_not_count_toward_window() {
        let mut config = test_config();
        config.max_queue_size = 1;
        let state = QueueState::new(config);

        assert_eq!(state.try_enqueue("a".to_string()).unwrap(), EnqueueStatus::Enqueued);
        assert!(matches!(state.try_enqueue("a".to_string()), Err(QueueError::Overloaded)));
        // Window should hold exactly one timestamp: the accepted request.
        let inner = state.inner.lock();
        assert_eq!(inner.windows.get("a").unwrap().timestamps.len(), 1);
    }

    #[test]
    fn promote_excess_to_main_moves_one_job() {
        let mut config = test_config();
        config.max_key_rate = 0;
        let state = QueueState::new(config);
        // With max_key_rate 0, the window starts empty, so the first request
        // for a key still lands in MAIN; only the next one is rate-limited.
        state.try_enqueue("x".to_string()).unwrap();
        state.try_enqueue("x".to_string()).unwrap();
        let (main, excess, _) = state.queue_lengths();
        assert_eq!(main, 1);
        assert_eq!(excess, 1);

        assert!(state.promote_excess_to_main());
        let (main, excess, _) = state.queue_lengths();
        assert_eq!(main, 2);
        assert_eq!(excess, 0);
    }

    #[test]
    fn sideline_stale_drops_when_full() {
        let mut config = test_config();
        config.spillover_queue_size = 1;
        let state = QueueState::new(config);
        state.sideline_stale(Job::new("a".to_string()));
        state.sideline_stale(Job::new("b".to_string()));
        let (_, _, stale) = state.queue_lengths();
        assert_eq!(stale, 1);
    }

    #[test]
    fn janitor_evicts_idle_windows_over_cap() {
        let mut config = test_config();
        config.max_tracked_keys = 2;
        let state = QueueState::new(config);
        state.try_enqueue("a".to_string()).unwrap();
        state.try_enqueue("b".to_string()).unwrap();
        state.try_enqueue("c".to_string()).unwrap();
        assert_eq!(state.tracked_key_count(), 3);
        state.run_janitor();
        assert_eq!(state.tracked_key_count(), 2);
    }

    #[test]
    fn two_hundred_rapid_requests_split_51_main_100_excess_49_rejected() {
        let mut config = test_config();
        config.max_queue_size = 1000;
        config.spillover_queue_size = 100;
        config.max_key_rate = 50;
        let state = QueueState::new(config);

        let mut enqueued = 0;
        let mut sidelined = 0;
        let mut rejected = 0;
        for _ in 0..200 {
            match state.try_enqueue("x".to_string()) {
                Ok(EnqueueStatus::Enqueued) => enqueued += 1,
                Ok(EnqueueStatus::SidelinedRate) => sidelined += 1,
                Err(QueueError::Overloaded) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(enqueued, 51);
        assert_eq!(sidelined, 100);
        assert_eq!(rejected, 49);
    }
}
