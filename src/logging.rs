//! Logging init: structured `tracing` output on stderr.
//!
//! Stdout is reserved for command output (cards, JSON), so log lines always
//! go to stderr. The filter comes from `RUST_LOG` when set.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,sheet_directory=info";
const VERBOSE_FILTER: &str = "info,sheet_directory=debug";

/// Installs the global subscriber. `verbose` raises the crate to debug and
/// everything else to info; an explicit `RUST_LOG` still wins.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding binaries) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
