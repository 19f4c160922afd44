//! Redirect-suppressing HTTP relay plugin.
//!
//! Forwards each request to the backend the host resolved, without following
//! 3xx responses, and mirrors the first response back: every header value,
//! the status, and the streamed body.
//!
//! A host registers the plugin through [`plugin::Registerer`] and receives a
//! [`http::RelayHandler`]. The `no-redirect` binary is a minimal standalone
//! host that does exactly that in front of one upstream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod plugin;

pub use config::HostConfig;
pub use http::{HttpServer, RelayHandler};
pub use lifecycle::Shutdown;
pub use plugin::{Logger, Registerer, RegistrationError, PLUGIN_NAME};
