//! Tracing initialization shared by binaries and test harnesses

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; falls back to `info` when unset. Safe to call more
/// than once (subsequent calls are no-ops), so test setup can invoke it
/// unconditionally.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init();
    });
}
