//! Tracing subscriber setup
//!
//! Logs go to stderr so that `--summary` output on stdout stays clean. The
//! filter comes from `RUST_LOG`, defaulting to `info`.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber; later calls are no-ops
pub fn init() {
    LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
            )
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
