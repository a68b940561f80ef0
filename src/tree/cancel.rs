//! Cooperative cancellation for evaluation runs
//!
//! The caller signals via a cancellation token. The executor checks the token
//! before each node pass. Nodes that already completed stay complete; a node
//! pass is never interrupted halfway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cooperative cancellation token with an optional deadline.
///
/// Clones share the cancellation flag. A timeout only becomes a deadline
/// when a run starts the token; once that deadline has passed it counts as
/// cancellation.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            timeout: None,
            deadline: None,
        }
    }

    /// Cancel automatically once `timeout` has elapsed from the start of a run
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// A clone for one run: same flag, deadline counted from now.
    pub fn start(&self) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            timeout: self.timeout,
            deadline: self.timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if cancellation has been requested or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
