//! Configuration schema definitions.
//!
//! Structure of the standalone host's TOML file. The `plugin` table is kept
//! untyped: it is the mapping handed to the plugin at registration, which
//! validates it itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plugin::PLUGIN_NAME;

/// Root configuration for the standalone host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Backend every inbound request is resolved against.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Registration mapping passed to the plugin.
    pub plugin: PluginConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream base URL. Scheme and authority replace the inbound ones; the
/// inbound path and query are kept.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration for the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed until the response head is produced, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Untyped registration mapping, e.g.
///
/// ```toml
/// [plugin]
/// name = "no-redirect"
///
/// [plugin.no-redirect]
/// connect_timeout_secs = 5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct PluginConfig(pub Map<String, Value>);

impl Default for PluginConfig {
    fn default() -> Self {
        let mut extra = Map::new();
        extra.insert("name".to_string(), Value::String(PLUGIN_NAME.to_string()));
        Self(extra)
    }
}

impl PluginConfig {
    /// The plugin name the host should look up, if present.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.0
    }
}
