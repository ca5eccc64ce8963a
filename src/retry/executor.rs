//! Retry execution
//!
//! Free functions for one-off call sites and [`RetryExecutor`] for call
//! sites that reuse one configured policy, optionally with cancellation and
//! an overall deadline.
//!
//! Attempts within one call are strictly sequential: attempt n+1 never
//! starts before attempt n has failed and its delay has elapsed. The wait
//! between attempts is a timer-based sleep and never blocks other tasks.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::utils::cancel::CancelHandle;

use super::policy::RetryPolicy;

/// Run `operation`, retrying every failure until the policy's attempt
/// budget is consumed.
///
/// Success short-circuits immediately. When the budget is exhausted, the
/// final failure is wrapped in [`Error::RetryExhausted`] together with the
/// number of attempts actually made. Failed attempts before the last are
/// logged, never surfaced.
pub async fn retry_with_backoff<T, F, Fut>(mut operation: F, policy: &RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_loop(&mut operation, policy, false, None, None).await
}

/// Like [`retry_with_backoff`], but a non-retryable error fails immediately
/// with the original error, regardless of the remaining attempt budget.
///
/// Retryability is decided by [`Error::is_retryable`]: network failures,
/// timeouts, connection failures, rate limits and 5xx API errors retry;
/// everything else is surfaced on the spot, unwrapped.
pub async fn retry_if_retryable<T, F, Fut>(mut operation: F, policy: &RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_loop(&mut operation, policy, true, None, None).await
}

/// Wrap `operation` so that every invocation of the returned function runs
/// it through [`retry_with_backoff`] with the given policy.
///
/// Pure composition: the adapter holds no state beyond the policy and the
/// wrapped operation.
pub fn with_retry<T, F, Fut>(
    operation: F,
    policy: RetryPolicy,
) -> impl Fn() -> BoxFuture<'static, Result<T>>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    move || {
        let operation = operation.clone();
        let policy = policy.clone();
        Box::pin(async move { retry_with_backoff(operation, &policy).await })
    }
}

/// Reusable executor pairing a policy with optional cancellation and an
/// optional overall deadline.
///
/// The free functions above carry no internal timeout; callers own it.
/// The executor is for call sites that need a loop they can abandon:
/// cancellation and the deadline are observed between attempts, so an
/// operation already in flight runs to completion.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    cancel: Option<CancelHandle>,
    deadline: Option<Duration>,
}

impl RetryExecutor {
    /// Create a new executor for the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancel: None,
            deadline: None,
        }
    }

    /// Observe `handle` between attempts; a cancelled loop fails with
    /// [`Error::Cancelled`].
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Bound the whole loop (attempts plus delays) by `overall`, measured
    /// from the start of `execute`. A loop that would sleep past the
    /// deadline fails with [`Error::Timeout`] instead.
    pub fn with_deadline(mut self, overall: Duration) -> Self {
        self.deadline = Some(overall);
        self
    }

    /// The configured policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `operation`, retrying every failure.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = self.deadline.map(|overall| Instant::now() + overall);
        retry_loop(&mut operation, &self.policy, false, self.cancel.as_ref(), deadline).await
    }

    /// Execute `operation`, retrying only retryable failures.
    pub async fn execute_if_retryable<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = self.deadline.map(|overall| Instant::now() + overall);
        retry_loop(&mut operation, &self.policy, true, self.cancel.as_ref(), deadline).await
    }
}

async fn retry_loop<T, F, Fut>(
    operation: &mut F,
    policy: &RetryPolicy,
    gate_on_retryable: bool,
    cancel: Option<&CancelHandle>,
    deadline: Option<Instant>,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        if let Some(handle) = cancel {
            if handle.is_cancelled() {
                return Err(Error::Cancelled(format!(
                    "retry loop cancelled after {attempt} attempts"
                )));
            }
        }

        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempts = attempt, "operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(error) => {
                if gate_on_retryable && !error.is_retryable() {
                    return Err(error);
                }

                if attempt >= max_attempts {
                    warn!(attempts = attempt, error = %error, "retries exhausted");
                    return Err(Error::RetryExhausted {
                        attempts: attempt,
                        last_error: Box::new(error),
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                if let Some(deadline) = deadline {
                    if Instant::now() + delay >= deadline {
                        return Err(Error::Timeout(format!(
                            "retry deadline exceeded after {attempt} attempts"
                        )));
                    }
                }

                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn failing_policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_base_delay(Duration::from_millis(10))
            .with_jitter(false)
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_second_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count == 0 {
                        Err(Error::api_error(500, "server error"))
                    } else {
                        Ok("success")
                    }
                }
            },
            &failing_policy().with_max_attempts(3),
        )
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn first_success_makes_a_single_invocation() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            },
            &failing_policy(),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_wraps_attempt_count_and_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(Error::api_error(500, format!("failure {n}")))
                }
            },
            &failing_policy().with_max_attempts(3),
        )
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            Error::RetryExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                match *last_error {
                    Error::Api { status, message, .. } => {
                        assert_eq!(status, 500);
                        assert_eq!(message, "failure 3");
                    }
                    other => panic!("unexpected inner error: {other:?}"),
                }
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_attempt_budget_means_no_retries() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::api_error(500, "server error"))
                }
            },
            &failing_policy().with_max_attempts(1),
        )
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result.unwrap_err(),
            Error::RetryExhausted { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately_unwrapped() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> = retry_if_retryable(
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::InvalidInput("bad payload".into()))
                }
            },
            &failing_policy().with_max_attempts(5),
        )
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), Error::InvalidInput(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_errors_are_retried_under_gating() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_if_retryable(
            || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(Error::RateLimited("slow down".into()))
                    } else {
                        Ok("through")
                    }
                }
            },
            &failing_policy().with_max_attempts(3),
        )
        .await;

        assert_eq!(result.unwrap(), "through");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_follow_the_schedule() {
        let policy = RetryPolicy::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0)
            .with_jitter(false);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = Instant::now();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(Error::api_error(503, "unavailable"))
                    } else {
                        Ok("ok")
                    }
                }
            },
            &policy,
        )
        .await;

        assert_eq!(result.unwrap(), "ok");
        // 100ms after the first failure, 200ms after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_between_attempts() {
        let handle = CancelHandle::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel_from_op = handle.clone();

        let executor = RetryExecutor::new(failing_policy().with_max_attempts(5))
            .with_cancel_handle(handle);

        let result: Result<()> = executor
            .execute(|| {
                let counter = counter_clone.clone();
                let cancel = cancel_from_op.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    cancel.cancel();
                    Err(Error::api_error(500, "server error"))
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), Error::Cancelled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_bounds_the_whole_loop() {
        let executor = RetryExecutor::new(
            RetryPolicy::new()
                .with_max_attempts(5)
                .with_base_delay(Duration::from_millis(200))
                .with_jitter(false),
        )
        .with_deadline(Duration::from_millis(50));

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> = executor
            .execute(|| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::api_error(500, "server error"))
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), Error::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn wrapped_function_retries_on_each_invocation() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let wrapped = with_retry(
            move || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    // Every odd invocation fails once, then succeeds.
                    if count % 2 == 0 {
                        Err(Error::api_error(500, "server error"))
                    } else {
                        Ok(count)
                    }
                }
            },
            failing_policy().with_max_attempts(2),
        );

        assert_eq!(wrapped().await.unwrap(), 1);
        assert_eq!(wrapped().await.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }
}
