use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber on stderr. `RUST_LOG` overrides the default
/// `info` level.
///
/// Records emitted through the `log` facade (actix's request logger) are
/// forwarded to the same subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second call keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
