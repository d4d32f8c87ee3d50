//! `tracing` initialization shared by every binary.

/// Install a global `tracing` subscriber honoring `RUST_LOG`, defaulting to
/// `info` when the variable is unset or invalid. Call once near the top of
/// `main`.
pub fn init_tracing(service: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    tracing::info!(service, "logging initialized");
}
