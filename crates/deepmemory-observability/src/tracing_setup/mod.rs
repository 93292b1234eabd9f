//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use std::sync::Once;

use deepmemory_core::config::defaults::DEFAULT_LOG_LEVEL;
use tracing_subscriber::EnvFilter;

/// Environment variable read by [`init_tracing`].
pub const LOG_ENV_VAR: &str = "DEEPMEMORY_LOG";

static INIT: Once = Once::new();

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `DEEPMEMORY_LOG` environment variable for filtering, e.g.
/// `DEEPMEMORY_LOG=deepmemory_retrieval=debug,deepmemory_graph=warn`.
/// Defaults to `info` if unset or invalid. Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        // Another subscriber may already be installed by the host process.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init();
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
///
/// Returns `false` when a global subscriber was already set.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
        .is_ok()
}
