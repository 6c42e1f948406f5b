//! Diagnostic sink setup (spec.md §6: `server.log_level`).
//!
//! stdout is the JSON-RPC wire channel, so unlike a typical service this
//! writes to stderr only - a stray log line on stdout would corrupt the
//! next line a client tries to parse.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("movies={log_level},movies_mcp={log_level},movies_db={log_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
