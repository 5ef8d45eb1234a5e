//! Tracing subscriber setup for hosts embedding the crate.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "context_manager=info";

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
