//! Cooperative cancellation for the worker loop
//!
//! Workers are never interrupted mid-task. The pool cancels a shared
//! [`CancellationToken`] and each worker observes it at the top of its loop,
//! between two timed queue waits.
//!
//! # Example
//!
//! ```rust
//! use rust_workload_generator::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let observer = token.clone();
//!
//! token.cancel();
//! assert!(observer.is_cancelled());
//! ```

use crate::core::{Result, WorkloadError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reason for cancellation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancellationReason {
    /// Explicit `cancel()` call
    Manual,
    /// The owning pool was stopped
    PoolStopped,
    /// The owning pool was dropped while running
    PoolDropped,
    /// Custom cancellation reason
    Custom(String),
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationReason::Manual => write!(f, "manually cancelled"),
            CancellationReason::PoolStopped => write!(f, "pool stopped"),
            CancellationReason::PoolDropped => write!(f, "pool dropped"),
            CancellationReason::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug)]
struct CancellationTokenInner {
    cancelled: AtomicBool,
    reason: RwLock<Option<CancellationReason>>,
}

/// A thread-safe, one-way cancellation signal.
///
/// Clones share state. Once cancelled a token stays cancelled; there is no
/// reset, which keeps the pool's Running to Stopped transition irreversible.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationTokenInner>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled)
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationTokenInner {
                cancelled: AtomicBool::new(false),
                reason: RwLock::new(None),
            }),
        }
    }

    /// Cancel this token with default reason (Manual)
    pub fn cancel(&self) {
        self.cancel_with_reason(CancellationReason::Manual);
    }

    /// Cancel this token with a specific reason.
    ///
    /// Only the first call records its reason; later calls are no-ops.
    pub fn cancel_with_reason(&self, reason: CancellationReason) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.inner.reason.write() = Some(reason);
    }

    /// Check if this token has been cancelled
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Returns the cancellation reason, `None` while not cancelled
    pub fn reason(&self) -> Option<CancellationReason> {
        self.inner.reason.read().clone()
    }

    /// Returns error if cancelled, `Ok(())` otherwise
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            let reason = self
                .reason()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Err(WorkloadError::cancelled(reason))
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
