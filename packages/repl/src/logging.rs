//! Diagnostic logging, off unless `SQLPAD_LOG` asks for it.
//!
//! Logs go to stderr so they never mix with query output on stdout.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SQLPAD_LOG";

/// Filter from `SQLPAD_LOG`, e.g. `debug` or `sqlpad_core=trace`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
