//! Logger capability handed to the plugin by its host.
//!
//! # Responsibilities
//! - Define the six-level logging interface the host may inject
//! - Provide a no-op default so an unwired plugin never fails on a log call
//! - Bridge the interface onto `tracing` for the standalone host

use std::fmt;

/// Logging interface a host may inject before building handlers.
///
/// Messages are passed as `fmt::Arguments` so nothing is formatted unless the
/// implementation decides to keep the line.
pub trait Logger: Send + Sync {
    fn debug(&self, args: fmt::Arguments<'_>);
    fn info(&self, args: fmt::Arguments<'_>);
    fn warning(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
    fn critical(&self, args: fmt::Arguments<'_>);
    /// Logs at the most severe level. Never terminates the process.
    fn fatal(&self, args: fmt::Arguments<'_>);
}

/// Discards every message. Used until a host registers a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _args: fmt::Arguments<'_>) {}
    fn info(&self, _args: fmt::Arguments<'_>) {}
    fn warning(&self, _args: fmt::Arguments<'_>) {}
    fn error(&self, _args: fmt::Arguments<'_>) {}
    fn critical(&self, _args: fmt::Arguments<'_>) {}
    fn fatal(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards plugin log lines to the `tracing` subscriber of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "no_redirect::plugin", "{}", args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "no_redirect::plugin", "{}", args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "no_redirect::plugin", "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "no_redirect::plugin", "{}", args);
    }

    fn critical(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "no_redirect::plugin", severity = "critical", "{}", args);
    }

    fn fatal(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "no_redirect::plugin", severity = "fatal", "{}", args);
    }
}
