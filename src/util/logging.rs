//! Diagnostic logging to stderr.
//!
//! Off unless `GOPASS_HELPER_LOG` holds a filter directive, so callers that
//! read the helper's stderr as an error message are not disturbed.

use crate::constants;
use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("off"));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
