//! Log setup. Logs go to stderr; stdout carries the display and events.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. TOMATICK_LOG overrides `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env("TOMATICK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
