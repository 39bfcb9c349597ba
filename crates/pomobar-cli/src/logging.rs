//! Diagnostic logging to stderr.

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `POMOBAR_LOG=pomobar_core=debug`.
const LOG_ENV: &str = "POMOBAR_LOG";
const DEFAULT_FILTER: &str = "pomobar=info,pomobar_core=info";

pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
