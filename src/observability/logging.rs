//! Structured logging.
//!
//! The configured level is the default filter; `RUST_LOG` overrides it.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global `tracing` subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let default_filter = format!(
        "no_redirect={level},tower_http={level}",
        level = config.log_level
    );

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
