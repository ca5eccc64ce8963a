//! Optimistic state coordination
//!
//! The coordinator owns a value of `T` and gives interactive consumers
//! immediate feedback for a mutation while the authoritative change is in
//! flight: the optimistic transform is visible synchronously, the server
//! value replaces it on success, and a rollback restores the caller's
//! previous intent on failure. In-flight mutations are tracked per id, so
//! out-of-order completion across concurrent updates is tolerated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::debug;

use crate::error::Error;
use crate::notify::{Notify, TracingNotify};

use super::update::Mutation;

/// Record kept for an update while its remote call is in flight.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    /// The mutation's unique token.
    pub id: String,
    /// When the optimistic transform was applied.
    pub started_at: Instant,
}

struct State<T> {
    data: T,
    pending: HashMap<String, PendingUpdate>,
    error: Option<Error>,
    loading: bool,
}

/// Owns a value of `T` and reconciles optimistic mutations against it.
///
/// Cloning shares the underlying state; the coordinator is intended to be
/// owned by one logical consumer, and sharing its mutation surface across
/// independent consumers needs external coordination.
pub struct OptimisticCoordinator<T> {
    state: Arc<Mutex<State<T>>>,
    notifier: Arc<dyn Notify>,
}

impl<T> Clone for OptimisticCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T: Clone + Send> OptimisticCoordinator<T> {
    /// Create a coordinator over `initial`, notifying through
    /// [`TracingNotify`].
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                data: initial,
                pending: HashMap::new(),
                error: None,
                loading: false,
            })),
            notifier: Arc::new(TracingNotify),
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier = notifier;
        self
    }

    // The state never holds a guard across an await and no mutation path
    // panics mid-write, so a poisoned lock still contains consistent state.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current (possibly optimistic) view of the data.
    pub fn data(&self) -> T {
        self.lock().data.clone()
    }

    /// Whether any update is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Whether the pending set is non-empty.
    pub fn has_pending_updates(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    /// Snapshot of the in-flight updates.
    pub fn pending_updates(&self) -> Vec<PendingUpdate> {
        self.lock().pending.values().cloned().collect()
    }

    /// The last reconciliation failure, if any.
    pub fn last_error(&self) -> Option<Error> {
        self.lock().error.clone()
    }

    /// Overwrite the data directly, bypassing reconciliation.
    pub fn set_data(&self, data: T) {
        self.lock().data = data;
    }

    /// Overwrite the loading flag directly.
    pub fn set_loading(&self, loading: bool) {
        self.lock().loading = loading;
    }

    /// Apply `update` optimistically, then reconcile with the remote
    /// result.
    ///
    /// The optimistic transform, the pending-set insertion and the error
    /// reset happen synchronously before the first await, atomically with
    /// respect to concurrent `apply_update` calls. The remote failure never
    /// propagates out of this method: it is converted into a rollback, a
    /// stored error and a notification.
    pub async fn apply_update<M: Mutation<T>>(&self, update: M) {
        let id = update.id().to_string();
        {
            let mut state = self.lock();
            let current = state.data.clone();
            state.data = update.apply(current);
            state.pending.insert(
                id.clone(),
                PendingUpdate {
                    id: id.clone(),
                    started_at: Instant::now(),
                },
            );
            state.error = None;
            state.loading = true;
        }
        debug!(update = %id, "optimistic transform applied");

        match update.remote().await {
            Ok(value) => {
                {
                    let mut state = self.lock();
                    state.pending.remove(&id);
                    state.data = value.clone();
                    state.loading = !state.pending.is_empty();
                }
                debug!(update = %id, "reconciled with server value");
                update.on_success(&value);
                if let Some(message) = update.success_message() {
                    self.notifier.success(message);
                }
            }
            Err(error) => {
                {
                    let mut state = self.lock();
                    state.pending.remove(&id);
                    // Rollback composes against the data current at failure
                    // time, not a snapshot from before the optimistic
                    // transform; see `Mutation::rollback` for the contract
                    // this puts on implementors.
                    let current = state.data.clone();
                    state.data = update.rollback(current);
                    state.error = Some(error.clone());
                    state.loading = !state.pending.is_empty();
                }
                debug!(update = %id, error = %error, "remote update failed, rolled back");
                update.on_error(&error);
                self.notifier.error(
                    update
                        .error_message()
                        .unwrap_or("Changes reverted due to an error"),
                );
            }
        }
    }
}
