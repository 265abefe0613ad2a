//! Rate limiting, retry and configuration for the LLM gateway.
//!
//! Every model call passes through a [`RateLimiter`], which waits on the
//! provider's request/token/daily quotas and a concurrency gate, then retries
//! transient failures with exponential backoff and jitter. Quotas come from
//! [`ScenaristConfig`], which also carries the workflow and storage settings.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod detector;
mod limiter;
mod tier;
pub mod tiers;

pub use config::{
    ModelTierConfig, ProviderConfig, ScenaristConfig, StorageSettings, TierConfig,
    WorkflowSettings,
};
pub use detector::HeaderRateLimitDetector;
pub use limiter::{RateLimiter, RateLimiterGuard, RetryPolicy};
pub use tier::Tier;
