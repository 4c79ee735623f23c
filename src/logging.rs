//! Logging setup
//!
//! Log output goes to stderr so it never interleaves with the menus on
//! stdout. The level comes from RUST_LOG and defaults to "warn".

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Installs the global tracing subscriber
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter)
        .init();
}
