//! Registration schema and errors.
//!
//! The host hands the plugin an untyped mapping. It is checked once, here,
//! and turned into a [`RegistrationConfig`] before any handler exists:
//!
//! ```toml
//! name = "no-redirect"
//!
//! [no-redirect]
//! connect_timeout_secs = 5
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::plugin::PLUGIN_NAME;

/// Errors raised while registering the plugin or building its handler.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The mapping has no string `name` field.
    #[error("wrong config: missing string field `name`")]
    WrongConfig,

    /// The mapping targets another plugin.
    #[error("unknown register {0}")]
    UnknownRegister(String),

    /// The plugin sub-block does not match [`RelayOptions`].
    #[error("invalid no-redirect options: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    /// The host asked for a name no plugin advertised.
    #[error("no plugin registered under {0}")]
    NotRegistered(String),

    /// The outbound client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Plugin-specific settings, read from the sub-block keyed by the plugin name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayOptions {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for the whole upstream exchange, body included.
    pub timeout_secs: Option<u64>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: None,
        }
    }
}

impl RelayOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    pub name: String,
    pub options: RelayOptions,
}

impl RegistrationConfig {
    /// Validate the host-supplied mapping.
    pub fn from_extra(extra: &Map<String, Value>) -> Result<Self, RegistrationError> {
        let name = extra
            .get("name")
            .and_then(Value::as_str)
            .ok_or(RegistrationError::WrongConfig)?;

        if name != PLUGIN_NAME {
            return Err(RegistrationError::UnknownRegister(name.to_string()));
        }

        let options = match extra.get(PLUGIN_NAME) {
            Some(block) => RelayOptions::deserialize(block)
                .map_err(RegistrationError::InvalidOptions)?,
            None => RelayOptions::default(),
        };

        Ok(Self {
            name: name.to_string(),
            options,
        })
    }
}
