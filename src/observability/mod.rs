//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! host + relay produce:
//!     → logging.rs (tracing subscriber, env filter)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The relay itself logs through the injected plugin logger; `tracing` is the
//! host's channel and the sink behind `TracingLogger`.

pub mod logging;
pub mod metrics;
