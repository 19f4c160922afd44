//! Host side of the registration handshake.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::http::relay::RelayHandler;
use crate::plugin::registration::RegistrationError;

/// Builds a handler from the host's untyped configuration mapping.
pub type HandlerFactory =
    Box<dyn Fn(&Map<String, Value>) -> Result<RelayHandler, RegistrationError> + Send + Sync>;

/// Callback a plugin uses to publish its factory under a name.
pub trait ClientRegistry {
    fn register_client(&mut self, name: &str, factory: HandlerFactory);
}

/// In-process registry used by the standalone host and tests.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the handler registered under `name`.
    pub fn build(
        &self,
        name: &str,
        extra: &Map<String, Value>,
    ) -> Result<RelayHandler, RegistrationError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistrationError::NotRegistered(name.to_string()))?;
        factory(extra)
    }
}

impl ClientRegistry for HandlerRegistry {
    fn register_client(&mut self, name: &str, factory: HandlerFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            tracing::warn!(plugin = name, "Plugin registered twice, keeping the latest factory");
        } else {
            tracing::debug!(plugin = name, "Plugin registered");
        }
    }
}
