//! Structured logging on stderr using **tracing**.
//!
//! Stdout is reserved for the report, so every event goes to stderr.
//! `RUST_LOG` overrides the level picked from the CLI flags.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, before scanning.
pub fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr);

    // A second init (tests, watch re-runs) is harmless; keep the first subscriber.
    if json {
        let _ = builder
            .json()
            .with_ansi(false)
            .with_current_span(true)
            .try_init();
    } else {
        let _ = builder.try_init();
    }
}
