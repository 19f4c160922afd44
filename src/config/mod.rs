//! Configuration management for the standalone host.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HostConfig (validated, immutable)
//!     → `plugin` table handed to the registerer as an untyped mapping
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The plugin validates its own block; the host only checks it names one

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HostConfig, ListenerConfig, ObservabilityConfig, PluginConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
