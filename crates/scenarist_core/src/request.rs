//! Request and response types for LLM generation.

use crate::Attachment;
use scenarist_error::BuilderError;
use serde::{Deserialize, Serialize};

/// A single generation request (prompt plus attachments and sampling knobs).
///
/// # Examples
///
/// ```
/// use scenarist_core::{Attachment, GenerateRequest};
///
/// let request = GenerateRequest::builder()
///     .prompt("Verify each hypothesis against public sources.")
///     .attachments(vec![Attachment::text("hypotheses.txt", "1. ...")])
///     .web_search(true)
///     .thinking(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.temperature(), 0.7);
/// assert_eq!(*request.top_k(), 40);
/// assert_eq!(request.thinking_budget(), 1024);
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_builder::Builder,
)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct GenerateRequest {
    /// Prompt text
    prompt: String,
    /// Documents sent with the prompt
    #[builder(default)]
    attachments: Vec<Attachment>,
    /// Model override; the driver's default model is used when unset
    #[builder(default)]
    model: Option<String>,
    /// Sampling temperature
    #[builder(default = "0.7")]
    temperature: f32,
    /// Nucleus sampling threshold
    #[builder(default = "0.8")]
    top_p: f32,
    /// Top-k sampling
    #[builder(default = "40")]
    top_k: u32,
    /// Output token cap
    #[builder(default = "4096")]
    max_output_tokens: u32,
    /// Enable the provider's web search grounding tool
    #[builder(default)]
    web_search: bool,
    /// Enable extended reasoning
    #[builder(default)]
    thinking: bool,
    /// JSON schema constraining the response
    #[builder(default)]
    response_schema: Option<serde_json::Value>,
}

impl GenerateRequest {
    /// Thinking budget in tokens when reasoning is enabled.
    pub const THINKING_BUDGET: u32 = 1024;

    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Thinking budget sent to the provider (0 disables reasoning).
    pub fn thinking_budget(&self) -> u32 {
        if self.thinking {
            Self::THINKING_BUDGET
        } else {
            0
        }
    }

    /// Returns a copy of this request constrained to the given schema.
    pub fn with_schema(&self, schema: serde_json::Value) -> Self {
        let mut request = self.clone();
        request.response_schema = Some(schema);
        request
    }

    /// Total attachment payload in bytes.
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(Attachment::len).sum()
    }
}

impl GenerateRequestBuilder {
    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt was not set or a sampling value is out
    /// of range.
    #[track_caller]
    pub fn build(&self) -> Result<GenerateRequest, BuilderError> {
        let request = self
            .build_internal()
            .map_err(|e| BuilderError::incomplete(e.to_string()))?;
        if !(0.0..=2.0).contains(&request.temperature) {
            return Err(format!(
                "temperature must be within [0.0, 2.0], got {}",
                request.temperature
            )
            .into());
        }
        if request.max_output_tokens == 0 {
            return Err(String::from("max_output_tokens must be positive").into());
        }
        Ok(request)
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt and attachments
    pub prompt_tokens: u64,
    /// Tokens generated by the model
    pub completion_tokens: u64,
    /// Total tokens billed
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Creates a usage record, deriving the total.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
        self.total_tokens += rhs.total_tokens;
    }
}

/// Free-text model response.
///
/// # Examples
///
/// ```
/// use scenarist_core::{GenerateResponse, TokenUsage};
///
/// let response = GenerateResponse {
///     text: "1. The lighthouse keeper kept two logbooks.".to_string(),
///     usage: TokenUsage::new(1200, 85),
/// };
/// assert_eq!(response.usage.total_tokens, 1285);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Concatenated candidate text
    pub text: String,
    /// Token usage for the call
    pub usage: TokenUsage,
}
