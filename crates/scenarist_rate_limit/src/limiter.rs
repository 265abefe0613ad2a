//! Rate limiter built on governor (GCRA) and a Tokio semaphore.

use crate::Tier;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use scenarist_error::{LlmError, LlmErrorKind, RetryableError};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, info, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: u64 = 86_400;

/// Retry overrides applied on top of the per-error strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fail on the first error
    pub no_retry: bool,
    /// Override the number of retries
    pub max_retries: Option<usize>,
    /// Override the initial backoff
    pub retry_backoff_ms: Option<u64>,
}

/// Enforces RPM, TPM, RPD and concurrency limits for a wrapped value.
///
/// The limiter owns a value implementing [`Tier`] (typically a client paired
/// with its limits); [`RateLimiter::inner`] exposes it.
///
/// # Example
///
/// ```
/// use scenarist_rate_limit::{RateLimiter, tiers::GeminiTier};
///
/// # #[tokio::main]
/// # async fn main() {
/// let limiter = RateLimiter::new(GeminiTier::Free);
/// let guard = limiter.acquire(500).await.unwrap();
/// assert!(limiter.try_acquire(1).is_none());
/// drop(guard);
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter<T: Tier> {
    inner: T,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    tpm_limiter: Option<(Arc<DirectRateLimiter>, NonZeroU32)>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl<T: Tier> RateLimiter<T> {
    /// Create a limiter enforcing every non-`None` limit of `tier`.
    pub fn new(tier: T) -> Self {
        let rpm_limiter = tier
            .rpm()
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));

        let tpm_limiter = tier
            .tpm()
            .and_then(|tpm| NonZeroU32::new(tpm.min(u32::MAX as u64) as u32))
            .map(|n| (Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))), n));

        // Daily quota replenishes evenly over 24h, with the whole day as burst.
        let rpd_limiter = tier.rpd().and_then(NonZeroU32::new).and_then(|n| {
            let period = Duration::from_secs((SECONDS_PER_DAY / n.get() as u64).max(1));
            Quota::with_period(period)
                .map(|q| Arc::new(GovernorRateLimiter::direct(q.allow_burst(n))))
        });

        let max_concurrent = tier
            .max_concurrent()
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);
        let concurrent_semaphore = Arc::new(Semaphore::new(max_concurrent));

        Self {
            inner: tier,
            rpm_limiter,
            tpm_limiter,
            rpd_limiter,
            concurrent_semaphore,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a limiter with retry overrides.
    pub fn new_with_retry(
        tier: T,
        no_retry: bool,
        max_retries: Option<usize>,
        retry_backoff_ms: Option<u64>,
    ) -> Self {
        let mut limiter = Self::new(tier);
        limiter.retry = RetryPolicy {
            no_retry,
            max_retries,
            retry_backoff_ms,
        };
        limiter
    }

    /// The wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Retry overrides in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn token_cells(estimated_tokens: u64, capacity: NonZeroU32) -> NonZeroU32 {
        let wanted = estimated_tokens.clamp(1, capacity.get() as u64) as u32;
        NonZeroU32::new(wanted).unwrap_or(NonZeroU32::MIN)
    }

    /// Wait until every limit admits a request of `estimated_tokens`.
    ///
    /// The returned guard holds a concurrency slot until dropped.
    ///
    /// # Errors
    ///
    /// Fails only if the concurrency gate has been closed.
    pub async fn acquire(&self, estimated_tokens: u64) -> Result<RateLimiterGuard, LlmError> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let Some((limiter, capacity)) = &self.tpm_limiter {
            let cells = Self::token_cells(estimated_tokens, *capacity);
            // Cells are clamped to the burst size, so capacity is always sufficient.
            if limiter.until_n_ready(cells).await.is_err() {
                warn!(tokens = estimated_tokens, "Token estimate exceeds TPM burst");
            }
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LlmError::new(LlmErrorKind::RateLimiterClosed))?;

        Ok(RateLimiterGuard { _permit: permit })
    }

    /// Acquire without waiting; `None` if any limit would block.
    pub fn try_acquire(&self, estimated_tokens: u64) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let Some((limiter, capacity)) = &self.tpm_limiter {
            let cells = Self::token_cells(estimated_tokens, *capacity);
            limiter.check_n(cells).ok()?.ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RateLimiterGuard { _permit: permit })
    }

    /// Run `operation` under the limits, retrying transient failures.
    ///
    /// The first failure picks the backoff strategy
    /// ([`RetryableError::retry_strategy_params`]), adjusted by the
    /// [`RetryPolicy`] overrides. A server-provided delay
    /// ([`RetryableError::retry_after`]) replaces the computed backoff for
    /// that attempt. Permanent errors return immediately.
    pub async fn execute<F, Fut, R, E>(&self, estimated_tokens: u64, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display + From<LlmError>,
    {
        let first = {
            let _guard = self.acquire(estimated_tokens).await?;
            operation().await
        };

        let err = match first {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if self.retry.no_retry || !err.is_retryable() {
            warn!(error = %err, "Permanent error or retry disabled, failing immediately");
            return Err(err);
        }

        let (mut initial_ms, mut max_retries, max_delay_secs) = err.retry_strategy_params();
        if let Some(backoff) = self.retry.retry_backoff_ms {
            initial_ms = backoff;
        }
        if let Some(retries) = self.retry.max_retries {
            max_retries = retries;
        }
        if max_retries == 0 {
            return Err(err);
        }

        info!(
            error = %err,
            initial_backoff_ms = initial_ms,
            max_retries,
            max_delay_secs,
            "Transient error, retrying"
        );

        let first_delay = err
            .retry_after()
            .unwrap_or_else(|| jitter(Duration::from_millis(initial_ms)));
        debug!(delay_ms = first_delay.as_millis() as u64, "Waiting before first retry");
        tokio::time::sleep(first_delay).await;

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries.saturating_sub(1));

        let operation = &operation;
        Retry::spawn(strategy, || async move {
            let _guard = self
                .acquire(estimated_tokens)
                .await
                .map_err(|e| RetryError::Permanent(E::from(e)))?;

            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Transient error, will retry");
                    let retry_after = e.retry_after();
                    Err(RetryError::Transient { err: e, retry_after })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

/// Holds a concurrency slot; releases it on drop.
pub struct RateLimiterGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
