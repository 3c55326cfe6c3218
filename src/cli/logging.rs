//! Diagnostic logging
//!
//! Logs go to stderr so they never mix with script or command output.
//! `RUNE_LOG` takes an `EnvFilter` directive (`debug`, `rune_cli=trace`, ...);
//! without it the level is `warn`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "RUNE_LOG";

pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
