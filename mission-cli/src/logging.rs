//! Structured logging for the `mc` client.
//!
//! Events go to stderr so command output on stdout stays machine-readable.

use crate::error::CliError;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MC_LOG";
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: `MC_LOG`, then `RUST_LOG`, then [`DEFAULT_DIRECTIVE`].
pub fn filter_directive(mc_log: Option<String>, rust_log: Option<String>) -> String {
    let set = |d: &String| !d.trim().is_empty();
    mc_log
        .filter(set)
        .or_else(|| rust_log.filter(set))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

fn env_filter() -> EnvFilter {
    let directive = filter_directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. `json` switches to one JSON object per event.
pub fn init(json: bool) -> Result<(), CliError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}
