//! Per-request execution context: an optional deadline plus a shared cancel flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Carries the cancellation state of one inbound call.
///
/// Clones share the cancel flag. Only checked at operation entry; in
/// production the deadline is what trips it, since a client disconnect drops
/// the handler future instead.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never expires on its own.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Deadline `timeout` from now. Overflowing durations mean no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    #[cfg(test)]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<&'static str> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Some("context canceled");
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some("context deadline exceeded"),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}
