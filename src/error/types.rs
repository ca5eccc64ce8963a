//! Core error types.

/// Errors produced by the retry engine and the optimistic coordinator.
///
/// The enum is `Clone` so a failure can be both stored as coordinator state
/// and handed to caller-supplied hooks. Retryability is a property of the
/// variant, not of the call site; see [`Error::is_retryable`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Network-layer failure (DNS, TLS, unreachable host).
    #[error("Network error: {0}")]
    Network(String),

    /// The operation or connection timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Low-level connection failure (reset, refused, broken pipe).
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP-like failure carrying the response status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the remote side.
        message: String,
        /// Optional structured response body.
        details: Option<serde_json::Value>,
    },

    /// Rate limited by the remote side (HTTP 429).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Input rejected before or by the remote side (4xx-class, validation).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation was cancelled through a
    /// [`CancelHandle`](crate::utils::cancel::CancelHandle).
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Every attempt of a retried operation failed.
    ///
    /// Distinguished from the plain underlying error so callers can branch
    /// on "retries exhausted" vs "immediate hard failure".
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// Attempts actually made, including the first.
        attempts: u32,
        /// The final underlying failure.
        #[source]
        last_error: Box<Error>,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an API error without structured details.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Create an API error with a structured response body attached.
    pub fn api_error_with_details(
        status: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::Api {
            status,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Map an HTTP status into the matching variant.
    ///
    /// 429 becomes [`Error::RateLimited`], 408 a [`Error::Timeout`], other
    /// 4xx validation-shaped statuses become [`Error::InvalidInput`], and
    /// everything else stays an [`Error::Api`] with the original status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::RateLimited(message),
            408 => Self::Timeout(message),
            400 | 422 => Self::InvalidInput(message),
            _ => Self::Api {
                status,
                message,
                details: None,
            },
        }
    }

    /// Whether the failure is transient and safe to retry.
    ///
    /// Retryable: network failures, timeouts, connection failures, rate
    /// limits, and server-side (5xx) API errors. Everything else is
    /// surfaced immediately by the retryable-aware entry points.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::Connection(_) | Self::RateLimited(_) => {
                true
            }
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::RetryExhausted { last_error, .. } => last_error.status_code(),
            _ => None,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
