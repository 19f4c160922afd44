//! Plugin registration subsystem.
//!
//! # Data Flow
//! ```text
//! host
//!     → Registerer::register_logger (optional, no-op logger otherwise)
//!     → Registerer::register_clients(&mut registry)
//!         → registry.register_client("no-redirect", factory)
//!     → registry.build(name, extra)
//!         → registration.rs (validate `name`, parse options)
//!         → client.rs (redirect-free client)
//!         → RelayHandler
//! ```
//!
//! # Design Decisions
//! - The logger is passed into each handler, never stored globally
//! - Each handler gets its own client; the redirect policy is never toggled
//! - A failed registration yields no handler and does not affect the host

pub mod logger;
pub mod registration;
pub mod registry;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::http::client::build_client;
use crate::http::relay::RelayHandler;

pub use logger::{Logger, NoopLogger, TracingLogger};
pub use registration::{RegistrationConfig, RegistrationError, RelayOptions};
pub use registry::{ClientRegistry, HandlerFactory, HandlerRegistry};

/// Name the plugin advertises to its host.
pub const PLUGIN_NAME: &str = "no-redirect";

/// Entry point a host uses to discover and instantiate the relay.
#[derive(Clone)]
pub struct Registerer {
    logger: Arc<dyn Logger>,
}

impl Default for Registerer {
    fn default() -> Self {
        Self::new()
    }
}

impl Registerer {
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NoopLogger),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Replace the logger used by handlers built from now on.
    pub fn register_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
        self.logger
            .debug(format_args!("[PLUGIN: {}] Logger loaded", PLUGIN_NAME));
    }

    /// Advertise the plugin to the host's registry.
    pub fn register_clients<R: ClientRegistry + ?Sized>(&self, registry: &mut R) {
        let registerer = self.clone();
        registry.register_client(
            PLUGIN_NAME,
            Box::new(move |extra: &Map<String, Value>| registerer.register_client(extra)),
        );
    }

    /// Validate `extra` and build a handler with its own client.
    pub fn register_client(
        &self,
        extra: &Map<String, Value>,
    ) -> Result<RelayHandler, RegistrationError> {
        let config = RegistrationConfig::from_extra(extra)?;
        let client = build_client(&config.options).map_err(RegistrationError::Client)?;

        self.logger.debug(format_args!(
            "[PLUGIN: {}] handler ready (connect timeout {}s, timeout {})",
            PLUGIN_NAME,
            config.options.connect_timeout_secs,
            config
                .options
                .timeout_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string())
        ));

        Ok(RelayHandler::new(client, Arc::clone(&self.logger)))
    }
}
