//! Gemini client with per-model rate limiting.
//!
//! Each model gets its own [`RateLimiter`], created lazily from the tier
//! configuration with that model's overrides applied, so calls to different
//! models do not share quotas.

use super::dto::{GeminiRequest, GeminiResponse, parse_error_response};
use async_trait::async_trait;
use scenarist_core::{GenerateRequest, GenerateResponse, TokenUsage};
use scenarist_error::{LlmError, LlmErrorKind, ScenaristError, ScenaristResult};
use scenarist_interface::{LlmDriver, StructuredResponse};
use scenarist_rate_limit::{
    HeaderRateLimitDetector, RateLimiter, RetryPolicy, ScenaristConfig, TierConfig,
    tiers::GeminiTier,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::{CallLabels, LlmMetrics};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const PROVIDER: &str = "gemini";

/// Client for the Gemini `generateContent` API.
///
/// Reads `GEMINI_API_KEY`; per-request model overrides are honoured.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model_name: String,
    base_tier: TierConfig,
    limiters: Arc<Mutex<HashMap<String, RateLimiter<TierConfig>>>>,
    retry: RetryPolicy,
    detector: HeaderRateLimitDetector,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("tier", &self.base_tier.name)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Client using the bundled configuration's default Gemini tier.
    ///
    /// # Errors
    ///
    /// Fails when `GEMINI_API_KEY` is not set.
    #[instrument(name = "gemini_client_new")]
    pub fn new() -> ScenaristResult<Self> {
        let config = ScenaristConfig::bundled().unwrap_or_default();
        Self::new_with_config(&config, None)
    }

    /// Client using a tier from `config` (falls back to the built-in free tier).
    ///
    /// The default model is taken from `config.workflow.default_model`.
    ///
    /// # Errors
    ///
    /// Fails when `GEMINI_API_KEY` is not set.
    #[instrument(name = "gemini_client_new_with_config", skip(config))]
    pub fn new_with_config(
        config: &ScenaristConfig,
        tier_name: Option<&str>,
    ) -> ScenaristResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ScenaristError::from(LlmError::new(LlmErrorKind::MissingApiKey)))?;

        let tier = config
            .get_tier(PROVIDER, tier_name)
            .unwrap_or_else(|| TierConfig::from_tier(&GeminiTier::Free));

        let mut client = Self::with_api_key(api_key, tier)?;
        if !config.workflow.default_model.is_empty() {
            client.model_name = config.workflow.default_model.clone();
        }
        Ok(client)
    }

    /// Client with an explicit key and tier.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_api_key(api_key: impl Into<String>, tier: TierConfig) -> ScenaristResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| LlmError::new(LlmErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            base_tier: tier,
            limiters: Arc::new(Mutex::new(HashMap::new())),
            retry: RetryPolicy::default(),
            detector: HeaderRateLimitDetector::new(),
        })
    }

    /// Sets the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    /// Points the client at another endpoint root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets retry overrides. Limiters created earlier keep their settings.
    pub fn with_retry(
        mut self,
        no_retry: bool,
        max_retries: Option<usize>,
        retry_backoff_ms: Option<u64>,
    ) -> Self {
        self.retry = RetryPolicy {
            no_retry,
            max_retries,
            retry_backoff_ms,
        };
        self.limiters = Arc::new(Mutex::new(HashMap::new()));
        self
    }

    /// Tier inferred from the latest response headers, if any.
    pub async fn detected_tier(&self) -> Option<TierConfig> {
        self.detector.get_cached().await
    }

    fn limiter_for(&self, model: &str) -> RateLimiter<TierConfig> {
        let mut limiters = self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        limiters
            .entry(model.to_string())
            .or_insert_with(|| {
                debug!(model, "Creating rate limiter for model");
                RateLimiter::new_with_retry(
                    self.base_tier.for_model(model),
                    self.retry.no_retry,
                    self.retry.max_retries,
                    self.retry.retry_backoff_ms,
                )
            })
            .clone()
    }

    /// Rough token estimate used for TPM limiting: ~4 bytes per token.
    fn estimate_tokens(req: &GenerateRequest) -> u64 {
        let input = (req.prompt().len() + req.attachment_bytes()) / 4;
        input.max(1) as u64 + *req.max_output_tokens() as u64
    }

    async fn send_once(
        &self,
        model: &str,
        body: &GeminiRequest,
    ) -> Result<GeminiResponse, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::new(LlmErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if let Some(remaining) = HeaderRateLimitDetector::remaining(response.headers()) {
            debug!(remaining, "Rate limit remaining");
        }
        self.detector.detect_gemini(response.headers()).await;

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error_response(
                status.as_u16(),
                &body,
                retry_after.as_deref(),
            ));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| LlmError::new(LlmErrorKind::InvalidResponse(e.to_string())))
    }

    #[instrument(
        skip(self, req, schema),
        fields(
            model = tracing::field::Empty,
            attachments = req.attachments().len(),
            web_search = *req.web_search(),
            thinking = *req.thinking(),
            structured = schema.is_some()
        )
    )]
    async fn generate_internal(
        &self,
        req: &GenerateRequest,
        schema: Option<&serde_json::Value>,
    ) -> Result<(String, TokenUsage), LlmError> {
        let model = req.model().clone().unwrap_or_else(|| self.model_name.clone());
        tracing::Span::current().record("model", model.as_str());

        let body = GeminiRequest::from_request(req, &model, schema);
        let limiter = self.limiter_for(&model);
        let estimate = Self::estimate_tokens(req);
        let metrics = LlmMetrics::get();
        let labels = CallLabels::new(PROVIDER, &model, schema.is_some());
        let started = Instant::now();

        let (model_ref, body_ref) = (&model, &body);
        let result = limiter
            .execute(estimate, || async move {
                let response = self.send_once(model_ref, body_ref).await?;
                let text = response.text()?;
                if response.finish_reason() == Some("MAX_TOKENS") {
                    warn!(model = %model_ref, "Response truncated at max_output_tokens");
                }
                Ok::<_, LlmError>((text, response.usage()))
            })
            .await;

        match &result {
            Ok((_, usage)) => {
                metrics.record_success(
                    &labels,
                    started.elapsed().as_secs_f64(),
                    usage,
                    req.attachment_bytes(),
                );
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Gemini call completed"
                );
            }
            Err(e) => {
                metrics.record_failure(&labels, started.elapsed().as_secs_f64(), &e.kind);
                warn!(error = %e, "Gemini call failed");
            }
        }

        result
    }
}

#[async_trait]
impl LlmDriver for GeminiClient {
    async fn call_llm(&self, req: &GenerateRequest) -> ScenaristResult<GenerateResponse> {
        let (text, usage) = self.generate_internal(req, None).await?;
        Ok(GenerateResponse { text, usage })
    }

    async fn structured_call_llm(
        &self,
        req: &GenerateRequest,
        schema: &serde_json::Value,
    ) -> ScenaristResult<StructuredResponse> {
        let (text, usage) = self.generate_internal(req, Some(schema)).await?;
        Ok(StructuredResponse::from_text(text, usage))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
