//! tracing subscriber setup for the binary
//!
//! everything goes to stderr so stdout stays clean for program output and
//! JSON results

use tracing_subscriber::EnvFilter;

/// env var holding a filter directive, e.g. `railblocks=debug`
pub const LOG_ENV_VAR: &str = "RAILBLOCKS_LOG";

/// filter used when the config has no usable level
const FALLBACK_FILTER: &str = "warn";

/// pick the filter: env var, then --verbose, then the configured level
pub fn build_filter(verbose: bool, configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return filter;
    }
    if verbose {
        return EnvFilter::new("debug");
    }
    configured
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_FILTER))
}

/// install the global subscriber; a second call is a no-op
pub fn init(verbose: bool, configured: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, configured))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
