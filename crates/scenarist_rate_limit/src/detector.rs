//! Detection of rate limits from response headers.

use crate::TierConfig;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Parses `x-ratelimit-*` headers and caches the inferred tier.
///
/// Header values reflect the account's live limits, so they win over
/// configured values once seen.
///
/// # Example
///
/// ```
/// use reqwest::header::{HeaderMap, HeaderValue};
/// use scenarist_rate_limit::HeaderRateLimitDetector;
///
/// # #[tokio::main]
/// # async fn main() {
/// let detector = HeaderRateLimitDetector::new();
/// let mut headers = HeaderMap::new();
/// headers.insert("x-ratelimit-limit", HeaderValue::from_static("1000"));
///
/// let tier = detector.detect_gemini(&headers).await.unwrap();
/// assert_eq!(tier.rpm, Some(1000));
/// assert_eq!(detector.get_cached().await.unwrap().name, "Tier 1");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderRateLimitDetector {
    detected_limits: Arc<RwLock<Option<TierConfig>>>,
}

impl HeaderRateLimitDetector {
    /// Create a detector with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Infer Gemini limits from `x-ratelimit-limit`.
    ///
    /// Gemini only reports the request limit, so token and daily limits are
    /// inferred from it. Returns `None` when the header is absent.
    #[instrument(skip(self, headers))]
    pub async fn detect_gemini(&self, headers: &HeaderMap) -> Option<TierConfig> {
        let rpm = parse_header_u32(headers, "x-ratelimit-limit")?;
        debug!(rpm, "Detected RPM from x-ratelimit-limit header");

        let config = if rpm <= 15 {
            TierConfig {
                name: "Free".to_string(),
                rpm: Some(rpm),
                tpm: Some(250_000),
                rpd: Some(250),
                max_concurrent: Some(1),
                daily_quota_usd: None,
                cost_per_million_input_tokens: Some(0.0),
                cost_per_million_output_tokens: Some(0.0),
                models: HashMap::new(),
            }
        } else {
            TierConfig {
                name: "Tier 1".to_string(),
                rpm: Some(rpm),
                tpm: Some(1_000_000),
                rpd: Some(10_000),
                max_concurrent: Some(4),
                daily_quota_usd: None,
                cost_per_million_input_tokens: Some(0.30),
                cost_per_million_output_tokens: Some(2.50),
                models: HashMap::new(),
            }
        };

        *self.detected_limits.write().await = Some(config.clone());
        Some(config)
    }

    /// Requests remaining in the current window, if reported.
    pub fn remaining(headers: &HeaderMap) -> Option<u32> {
        parse_header_u32(headers, "x-ratelimit-remaining")
    }

    /// Most recently detected limits.
    pub async fn get_cached(&self) -> Option<TierConfig> {
        self.detected_limits.read().await.clone()
    }

    /// Forget detected limits.
    pub async fn clear_cache(&self) {
        *self.detected_limits.write().await = None;
    }
}

fn parse_header_u32(headers: &HeaderMap, key: &str) -> Option<u32> {
    headers.get(key)?.to_str().ok()?.trim().parse().ok()
}
