//! reconcile
//!
//! Bounded retry with exponential backoff, and optimistic state
//! reconciliation for interactive async applications.
//!
//! Two independent utilities:
//! - [`retry`]: wrap a fallible async operation in a bounded
//!   exponential-backoff schedule, unconditionally or gated on error
//!   retryability.
//! - [`optimistic`]: apply a local mutation immediately, confirm it
//!   remotely, and reconcile deterministically: the server value replaces
//!   local state on success, a rollback restores it on failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use reconcile::prelude::*;
//! use std::time::Duration;
//!
//! # async fn fetch_profile() -> Result<String, reconcile::Error> { Ok("profile".into()) }
//! # async fn example() -> Result<(), reconcile::Error> {
//! // Retry a flaky call, but only on transient failures.
//! let policy = RetryPolicy::interactive().with_base_delay(Duration::from_millis(100));
//! let profile = retry_if_retryable(|| fetch_profile(), &policy).await?;
//!
//! // Give the UI immediate feedback while the server confirms.
//! let coordinator = OptimisticCoordinator::new(vec![JobApplication {
//!     id: "job-1".into(),
//!     company: "Acme".into(),
//!     role: "Backend Engineer".into(),
//!     stage: PipelineStage::Wishlist,
//! }]);
//! let update = factories::update_pipeline_stage(
//!     "job-1",
//!     PipelineStage::Applied,
//!     PipelineStage::Wishlist,
//!     || async { Ok(vec![]) },
//! );
//! coordinator.apply_update(update).await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod cache;
pub mod error;
pub mod notify;
pub mod optimistic;
pub mod retry;
pub mod types;
pub mod utils;

pub use error::Error;

/// Convenient single import for the common surface.
pub mod prelude {
    pub use crate::cache::ResponseCache;
    pub use crate::error::Error;
    pub use crate::notify::{Notify, TracingNotify};
    pub use crate::optimistic::{
        Mutation, OptimisticCoordinator, OptimisticUpdate, PendingUpdate, factories,
    };
    pub use crate::retry::{
        RetryExecutor, RetryPolicy, retry_if_retryable, retry_with_backoff, with_retry,
    };
    pub use crate::types::{Assignment, AssignmentStatus, JobApplication, Keyed, PipelineStage};
    pub use crate::utils::cancel::CancelHandle;
}
