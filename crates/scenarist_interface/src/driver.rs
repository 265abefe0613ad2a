//! LLM backend trait.

use async_trait::async_trait;
use scenarist_core::{GenerateRequest, GenerateResponse, TokenUsage};
use scenarist_error::ScenaristResult;
use serde::{Deserialize, Serialize};

/// Result of a schema-constrained call.
///
/// `parsed` is `None` when the model text is not valid JSON; callers still
/// get the raw text so it can be saved for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResponse {
    /// Raw model text
    pub text: String,
    /// Parsed JSON, if the text parsed
    pub parsed: Option<serde_json::Value>,
    /// Token usage for the call
    pub usage: TokenUsage,
}

impl StructuredResponse {
    /// Builds a structured response by attempting to parse `text` as JSON.
    pub fn from_text(text: String, usage: TokenUsage) -> Self {
        let parsed = serde_json::from_str(strip_code_fence(&text)).ok();
        Self {
            text,
            parsed,
            usage,
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Core trait that every LLM backend implements.
///
/// Both calls honour the request's sampling parameters, attachments and
/// model override. Retries on transient provider failures happen inside the
/// driver.
#[async_trait]
pub trait LlmDriver: Send + Sync {
    /// Free-text generation.
    async fn call_llm(&self, req: &GenerateRequest) -> ScenaristResult<GenerateResponse>;

    /// JSON generation constrained by `schema`.
    async fn structured_call_llm(
        &self,
        req: &GenerateRequest,
        schema: &serde_json::Value,
    ) -> ScenaristResult<StructuredResponse>;

    /// Provider name (e.g. "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}
