//! LLM gateway error types and retry classification.

use std::time::Duration;

/// LLM gateway error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LlmErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to build the HTTP client
    #[display("Failed to create LLM client: {}", _0)]
    ClientCreation(String),
    /// Request could not be sent or the body could not be read
    #[display("LLM request failed: {}", _0)]
    ApiRequest(String),
    /// Provider answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
        /// Server-suggested delay before retrying, in milliseconds
        retry_after_ms: Option<u64>,
    },
    /// Prompt was rejected by provider safety filters
    #[display("Prompt blocked: {}", _0)]
    Blocked(String),
    /// Response carried no candidate text
    #[display("LLM returned an empty response")]
    EmptyResponse,
    /// Response body did not match the provider schema
    #[display("Invalid LLM response: {}", _0)]
    InvalidResponse(String),
    /// The rate limiter's concurrency gate was shut down
    #[display("Rate limiter closed")]
    RateLimiterClosed,
}

impl LlmErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            LlmErrorKind::ApiRequest(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            LlmErrorKind::HttpError { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            LlmErrorKind::ApiRequest(_) => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }

    /// Server-provided retry delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmErrorKind::HttpError {
                retry_after_ms: Some(ms),
                ..
            } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }

    /// True for quota exhaustion (HTTP 429).
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmErrorKind::HttpError { status_code: 429, .. })
    }
}

/// LLM gateway error with source location tracking.
///
/// # Examples
///
/// ```
/// use scenarist_error::{LlmError, LlmErrorKind};
///
/// let err = LlmError::new(LlmErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("LLM Error: {} at line {} in {}", kind, line, file)]
pub struct LlmError {
    /// The kind of error that occurred
    pub kind: LlmErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LlmError {
    /// Create a new LlmError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LlmErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use scenarist_error::{LlmError, LlmErrorKind, RetryableError};
///
/// let err = LlmError::new(LlmErrorKind::HttpError {
///     status_code: 429,
///     message: "Resource has been exhausted".to_string(),
///     retry_after_ms: Some(30_000),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 5000);
/// assert_eq!(retries, 3);
/// assert_eq!(err.retry_after().map(|d| d.as_secs()), Some(30));
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503, 429 or network timeouts return true.
    /// Permanent errors like 401 or 400 return false.
    fn is_retryable(&self) -> bool;

    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }

    /// Delay requested by the server before the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for LlmError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.kind.retry_after()
    }
}
