//! Logging bootstrap: a `tracing` fmt subscriber writing to stderr.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used, with the HTTP stack's
/// own chatter held back to `warn` unless the level already mentions it.
/// Calling this more than once is harmless: later calls are ignored.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &str) -> String {
    let mut filter = level.trim().to_string();
    if filter.is_empty() {
        filter.push_str("info");
    }
    for noisy in ["hyper", "reqwest", "html5ever"] {
        if !filter.contains(noisy) {
            filter.push_str(&format!(",{noisy}=warn"));
        }
    }
    filter
}
