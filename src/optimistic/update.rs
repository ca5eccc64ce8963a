//! Mutation descriptors
//!
//! A mutation is a one-shot strategy object: applied locally first,
//! confirmed remotely, rolled back on failure. Implement [`Mutation`] for a
//! bespoke type, or use the closure-backed [`OptimisticUpdate`] builder for
//! ad-hoc call sites.

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{Error, Result};

/// A one-shot optimistic mutation over a value of `T`.
///
/// Consumed exactly once by
/// [`OptimisticCoordinator::apply_update`](crate::optimistic::OptimisticCoordinator::apply_update),
/// then discarded; never reused or retried internally. Retry, if desired,
/// belongs inside [`remote`](Mutation::remote), e.g. by composing with the
/// retry engine.
#[async_trait]
pub trait Mutation<T>: Send + Sync {
    /// Unique token for this mutation while it is in flight. Uniqueness
    /// across rapid repeats is the implementor's responsibility; the
    /// factories append a UUID for that reason.
    fn id(&self) -> &str;

    /// Pure transform applied immediately to the local data.
    fn apply(&self, current: T) -> T;

    /// The authoritative remote call. Its returned value, not the
    /// optimistic guess, becomes the new source of truth.
    async fn remote(&self) -> Result<T>;

    /// Pure transform reverting [`apply`](Mutation::apply), used only on
    /// failure. Applied to the data current at failure time, which may
    /// include later optimistic transforms; write it to be correct against
    /// intervening changes.
    fn rollback(&self, current: T) -> T;

    /// Invoked with the server value after a successful reconciliation.
    fn on_success(&self, _value: &T) {}

    /// Invoked with the failure after a rollback.
    fn on_error(&self, _error: &Error) {}

    /// User-facing message for the notification sink on success.
    fn success_message(&self) -> Option<&str> {
        None
    }

    /// User-facing message for the notification sink on failure.
    fn error_message(&self) -> Option<&str> {
        None
    }
}

type TransformFn<T> = Box<dyn Fn(T) -> T + Send + Sync>;
type RemoteFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;
type SuccessHook<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&Error) + Send + Sync>;

/// Closure-backed [`Mutation`] with a builder for the optional pieces.
pub struct OptimisticUpdate<T> {
    id: String,
    apply: TransformFn<T>,
    remote: RemoteFn<T>,
    rollback: TransformFn<T>,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
    success_message: Option<String>,
    error_message: Option<String>,
}

impl<T: Send + 'static> OptimisticUpdate<T> {
    /// Build an update from its three core pieces.
    ///
    /// `id` must be unique among in-flight updates on the same coordinator.
    pub fn new<A, R, Fut, B>(id: impl Into<String>, apply: A, remote: R, rollback: B) -> Self
    where
        A: Fn(T) -> T + Send + Sync + 'static,
        R: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        B: Fn(T) -> T + Send + Sync + 'static,
    {
        let remote: RemoteFn<T> = Box::new(move || {
            let fut: BoxFuture<'static, Result<T>> = Box::pin(remote());
            fut
        });
        Self {
            id: id.into(),
            apply: Box::new(apply),
            remote,
            rollback: Box::new(rollback),
            on_success: None,
            on_error: None,
            success_message: None,
            error_message: None,
        }
    }

    /// Attach a success hook.
    pub fn with_on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Attach a failure hook.
    pub fn with_on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Set the user-facing success notification message.
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Set the user-facing failure notification message.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Mutation<T> for OptimisticUpdate<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, current: T) -> T {
        (self.apply)(current)
    }

    async fn remote(&self) -> Result<T> {
        (self.remote)().await
    }

    fn rollback(&self, current: T) -> T {
        (self.rollback)(current)
    }

    fn on_success(&self, value: &T) {
        if let Some(hook) = &self.on_success {
            hook(value);
        }
    }

    fn on_error(&self, error: &Error) {
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }

    fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl<T> std::fmt::Debug for OptimisticUpdate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticUpdate")
            .field("id", &self.id)
            .field("success_message", &self.success_message)
            .field("error_message", &self.error_message)
            .finish_non_exhaustive()
    }
}
