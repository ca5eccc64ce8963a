//! Retry policy configuration
//!
//! A policy is a plain value object: constructed fresh per call site and
//! immutable for the lifetime of the call. Delay growth is exponential with
//! an upper cap and optional additive jitter.

use rand::Rng;
use std::time::Duration;

/// Configuration for bounded exponential-backoff retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first (>= 1).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper cap applied to the computed delay.
    pub max_delay: Duration,
    /// Multiplier applied exponentially per attempt (>= 1).
    pub backoff_multiplier: f64,
    /// Whether to add up to 10% random extra delay, spreading synchronized
    /// retries across callers.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryPolicy {
    /// Create a new retry policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard policy for API calls: 3 attempts, 1s initial delay.
    pub const fn standard() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Fast policy for interactive UI actions: 2 attempts, 250ms initial.
    pub const fn interactive() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Aggressive policy for critical-path operations: 5 attempts, 500ms initial.
    pub const fn critical() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Patient policy for file uploads: 4 attempts, 2s initial, gentle growth.
    pub const fn upload() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(60_000),
            backoff_multiplier: 1.5,
            jitter: true,
        }
    }

    /// Set maximum attempts (clamped to at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the delay before the first retry.
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the delay cap.
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay applied after the `attempt`-th failure (1-based).
    ///
    /// Pre-jitter the delay is `min(base_delay * multiplier^(attempt-1),
    /// max_delay)`; with jitter enabled an extra uniform `[0, 10%)` of the
    /// capped delay is added, so the realized delay stays within
    /// `[capped, 1.1 * capped)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // Cap the exponent so powi cannot overflow; 31 doublings already
        // exceed any practical max_delay.
        let exp = attempt.saturating_sub(1).min(31) as i32;
        let base_ms = self.base_delay.as_millis() as f64 * self.backoff_multiplier.max(1.0).powi(exp);
        let capped_ms = base_ms.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            let mut rng = rand::thread_rng();
            capped_ms + capped_ms * 0.1 * rng.gen_range(0.0..1.0)
        } else {
            capped_ms
        };

        Duration::from_millis(delay_ms.max(0.0) as u64)
    }
}
