//! User-facing notification sink
//!
//! Consumers surface success/failure toasts; the library only defines the
//! seam. The sink is injected at construction, never a module global, so
//! independently-owned coordinators can route notifications differently.

use tracing::{info, warn};

/// Destination for user-visible success and failure notifications.
pub trait Notify: Send + Sync {
    /// A mutation was confirmed by the server.
    fn success(&self, message: &str);

    /// A mutation failed and was rolled back.
    fn error(&self, message: &str);
}

/// Default sink: forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotify;

impl Notify for TracingNotify {
    fn success(&self, message: &str) {
        info!(target: "reconcile::notify", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "reconcile::notify", "{message}");
    }
}
