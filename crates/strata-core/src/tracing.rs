//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber honoring `STRATA_LOG`
/// (falling back to `RUST_LOG`, then "warn").
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env("STRATA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
