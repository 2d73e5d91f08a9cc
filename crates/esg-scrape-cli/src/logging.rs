//! Tracing setup for the command line.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, else from `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
pub fn init(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .init();
}
