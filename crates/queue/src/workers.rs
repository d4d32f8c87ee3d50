//! Background loops dispatching queued jobs: `WORKER_COUNT` main workers, a
//! singleton excess worker, a singleton stale worker, and a rate-window
//! janitor. Each loop is a thin wrapper around a state method that tests can
//! call directly for deterministic single-step dispatch.

use crate::job::Job;
use crate::state::QueueState;
use std::sync::Arc;
use std::time::Duration;

const MAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);
const EXCESS_POLL_INTERVAL: Duration = Duration::from_millis(50);
const STALE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const STALE_RETRY_BACKOFF: Duration = Duration::from_millis(200);
const JANITOR_INTERVAL: Duration = Duration::from_secs(30);

/// One main worker: pop `MAIN`, sideline anything that aged out, otherwise
/// dispatch directly. Errors from dispatch are logged and the job is not
/// requeued — loss under upstream failure is the advertised trade-off,
/// bounded by reconciliation's monotone-max convergence.
pub async fn main_worker_loop(state: Arc<QueueState>) {
    loop {
        match state.pop_main() {
            Some(job) => step_main_job(&state, job).await,
            None => tokio::time::sleep(MAIN_POLL_INTERVAL).await,
        }
    }
}

/// Single-step body of [`main_worker_loop`], exposed for deterministic tests.
pub async fn step_main_job(state: &Arc<QueueState>, job: Job) {
    if state.is_stale(&job) {
        state.sideline_stale(job);
        return;
    }
    if let Err(err) = state.dispatch(&job).await {
        tracing::warn!(key = %job.key, error = %err, "main worker dispatch failed, dropping job");
    }
}

/// The excess worker: every tick, move one job from `EXCESS` to the tail of
/// `MAIN` if there is room. Excess jobs keep their original timestamp, so a
/// promoted job may be aged out again on the next main-worker pass —
/// starvation under sustained rate violation surfaces as staleness rather
/// than unbounded queueing.
pub async fn excess_worker_loop(state: Arc<QueueState>) {
    loop {
        tokio::time::sleep(EXCESS_POLL_INTERVAL).await;
        state.promote_excess_to_main();
    }
}

/// The stale worker: pop `STALE`, bump its retry count, drop it if the
/// budget is exhausted, otherwise back off and dispatch directly (no
/// re-staleness check).
pub async fn stale_worker_loop(state: Arc<QueueState>) {
    loop {
        match state.pop_stale() {
            Some(job) => step_stale_job(&state, job).await,
            None => tokio::time::sleep(STALE_POLL_INTERVAL).await,
        }
    }
}

/// Single-step body of [`stale_worker_loop`], exposed for deterministic tests.
pub async fn step_stale_job(state: &Arc<QueueState>, mut job: Job) {
    job.retries += 1;
    if job.retries > state.config().max_stale_retries {
        tracing::warn!(key = %job.key, retries = job.retries, "STALE retry budget exhausted, dropping job");
        return;
    }
    tokio::time::sleep(STALE_RETRY_BACKOFF).await;
    if let Err(err) = state.dispatch(&job).await {
        tracing::warn!(key = %job.key, error = %err, "stale worker dispatch failed, dropping job");
    }
}

/// Periodic sweep bounding the rate-window table's memory for long-running
/// processes with a churning key space.
pub async fn janitor_loop(state: Arc<QueueState>) {
    loop {
        tokio::time::sleep(JANITOR_INTERVAL).await;
        state.run_janitor();
    }
}
