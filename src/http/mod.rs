//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (host)
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, resolve against upstream)
//!     → relay.rs (outbound call via client.rs, redirects not followed)
//!     → body.rs (stream backend body, release once)
//!     → response mirrored to the caller
//! ```

pub mod body;
pub mod client;
pub mod relay;
pub mod request;
pub mod server;

pub use body::{BodyOutcome, BodyTracker};
pub use relay::{RelayError, RelayHandler};
pub use request::{UpstreamTarget, X_REQUEST_ID};
pub use server::HttpServer;
