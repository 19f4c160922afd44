//! Backend body lifecycle tracking.
//!
//! # Responsibilities
//! - Count backend bodies currently being relayed
//! - Release each backend body exactly once, whatever ends the copy
//! - Record how the copy ended for logs and metrics
//!
//! A [`BodyGuard`] is created when a backend response is accepted and moved
//! into the stream that feeds the caller. Dropping that stream (completion,
//! mid-copy error, or the caller going away) drops the guard, which is the
//! single release point.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// How a relayed body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOutcome {
    /// Every byte reached the caller.
    Complete,
    /// The backend stream failed after the status was sent.
    Failed,
    /// The caller dropped the response before the end of the body.
    Abandoned,
}

impl BodyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyOutcome::Complete => "complete",
            BodyOutcome::Failed => "failed",
            BodyOutcome::Abandoned => "abandoned",
        }
    }
}

/// Shared counters for backend bodies of one relay.
#[derive(Debug, Clone, Default)]
pub struct BodyTracker {
    open: Arc<AtomicU64>,
    released: Arc<AtomicU64>,
}

impl BodyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened backend body. Returns the guard that releases it.
    pub fn track(&self) -> BodyGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        metrics::body_opened();
        BodyGuard {
            tracker: self.clone(),
            bytes: 0,
            outcome: BodyOutcome::Abandoned,
        }
    }

    /// Bodies opened and not yet released.
    pub fn open_count(&self) -> u64 {
        self.open.load(Ordering::SeqCst)
    }

    /// Bodies released so far.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }
}

/// Owns the release of one backend body.
#[derive(Debug)]
pub struct BodyGuard {
    tracker: BodyTracker,
    bytes: u64,
    outcome: BodyOutcome,
}

impl BodyGuard {
    pub fn record_chunk(&mut self, len: usize) {
        self.bytes += len as u64;
    }

    pub fn mark(&mut self, outcome: BodyOutcome) {
        self.outcome = outcome;
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn outcome(&self) -> BodyOutcome {
        self.outcome
    }
}

impl Drop for BodyGuard {
    fn drop(&mut self) {
        self.tracker.open.fetch_sub(1, Ordering::SeqCst);
        self.tracker.released.fetch_add(1, Ordering::SeqCst);
        metrics::body_released();
        metrics::record_body(self.outcome.as_str(), self.bytes);
        tracing::trace!(
            bytes = self.bytes,
            outcome = self.outcome.as_str(),
            "Backend body released"
        );
    }
}
