//! Observability setup.
//!
//! Log output goes through `tracing-subscriber`. `RUST_LOG` controls the
//! filter (default `info`) and `LOG_FORMAT=json` switches to JSON lines.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).try_init()
    }
}
