//! Cancellation utilities
//!
//! Provides a first-class cancellation handle for retry loops and other
//! long-running operations.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A handle that can be used to request cancellation.
///
/// Cloning shares the underlying flag, so one clone can cancel a loop
/// driven by another. A retry loop observes the flag between attempts; an
/// attempt already in flight runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Any retry loop observing this handle stops
    /// before its next attempt.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
