//! Tracing initialisation

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
/// Safe to call more than once — later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
