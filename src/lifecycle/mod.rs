//! Lifecycle management.
//!
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Register plugin → Build handler → Listen
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → broadcast → stop accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
