//! Wire types for `models/{model}:generateContent`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use scenarist_core::{Attachment, GenerateRequest, TokenUsage};
use scenarist_error::{LlmError, LlmErrorKind};
use serde::{Deserialize, Serialize};

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns (a single user turn here)
    pub contents: Vec<Content>,
    /// Sampling and output settings
    pub generation_config: GenerationConfig,
    /// Enabled tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// "user" or "model"
    pub role: String,
    /// Turn parts
    pub parts: Vec<Part>,
}

/// A text or inline-document part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// Base64 document
    InlineData {
        /// Payload
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type
    pub mime_type: String,
    /// Base64 data
    pub data: String,
}

impl From<&Attachment> for Part {
    fn from(attachment: &Attachment) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: attachment.mime().as_str().to_string(),
                data: STANDARD.encode(attachment.data()),
            },
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Output token cap
    pub max_output_tokens: u32,
    /// Reasoning budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    /// `application/json` for structured calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// OpenAPI-subset schema for structured calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// Reasoning budget in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// 0 disables reasoning where the model allows it
    pub thinking_budget: u32,
}

/// A tool declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Google Search grounding
    pub google_search: GoogleSearch,
}

/// Empty marker object enabling search grounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoogleSearch {}

impl GeminiRequest {
    /// Builds the wire request for `req`, constrained by `schema` when given.
    ///
    /// The prompt comes first, followed by one inline part per attachment.
    /// Models that cannot disable reasoning (`*-pro`) get no thinking config
    /// when thinking is off.
    pub fn from_request(
        req: &GenerateRequest,
        model: &str,
        schema: Option<&serde_json::Value>,
    ) -> Self {
        let mut parts = Vec::with_capacity(req.attachments().len() + 1);
        parts.push(Part::Text {
            text: req.prompt().clone(),
        });
        parts.extend(req.attachments().iter().map(Part::from));

        let budget = req.thinking_budget();
        let thinking_config = if budget == 0 && model.contains("-pro") {
            None
        } else {
            Some(ThinkingConfig {
                thinking_budget: budget,
            })
        };

        let schema = schema.or(req.response_schema().as_ref()).cloned();
        let tools = if *req.web_search() {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: *req.temperature(),
                top_p: *req.top_p(),
                top_k: *req.top_k(),
                max_output_tokens: *req.max_output_tokens(),
                thinking_config,
                response_mime_type: schema.as_ref().map(|_| "application/json".to_string()),
                response_schema: schema,
            },
            tools,
        }
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token accounting
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// Safety feedback on the prompt
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A generated candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Parts of a candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    /// Content parts
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part; reasoning parts are flagged with `thought`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponsePart {
    /// Text, if a text part
    #[serde(default)]
    pub text: Option<String>,
    /// True for reasoning summaries
    #[serde(default)]
    pub thought: Option<bool>,
}

/// Token accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt tokens including attachments
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Generated tokens
    #[serde(default)]
    pub candidates_token_count: u64,
    /// Reasoning tokens
    #[serde(default)]
    pub thoughts_token_count: u64,
    /// Billed total
    #[serde(default)]
    pub total_token_count: u64,
}

/// Prompt safety feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GeminiResponse {
    /// Visible text of the first candidate (reasoning parts excluded).
    ///
    /// # Errors
    ///
    /// `Blocked` when the prompt was rejected, `EmptyResponse` when no text
    /// came back.
    pub fn text(&self) -> Result<String, LlmError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(LlmError::new(LlmErrorKind::Blocked(reason.clone())));
        }

        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought.unwrap_or(false))
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::new(LlmErrorKind::EmptyResponse));
        }
        Ok(text)
    }

    /// Finish reason of the first candidate.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }

    /// Token usage; reasoning tokens count as completion tokens.
    pub fn usage(&self) -> TokenUsage {
        match self.usage_metadata {
            Some(u) => {
                let completion = u.candidates_token_count + u.thoughts_token_count;
                TokenUsage {
                    prompt_tokens: u.prompt_token_count,
                    completion_tokens: completion,
                    total_tokens: u.total_token_count.max(u.prompt_token_count + completion),
                }
            }
            None => TokenUsage::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Builds an `HttpError` from a non-success response.
///
/// The message comes from the `error.message` field when the body is a
/// Google API error, else the raw body. A `google.rpc.RetryInfo` detail
/// (`"retryDelay": "27s"`) or a `Retry-After` header in seconds becomes
/// `retry_after_ms`.
pub fn parse_error_response(
    status_code: u16,
    body: &str,
    retry_after_header: Option<&str>,
) -> LlmError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let message = match &envelope {
        Some(e) => match &e.error.status {
            Some(status) => format!("{}: {}", status, e.error.message),
            None => e.error.message.clone(),
        },
        None => body.trim().to_string(),
    };

    let retry_after_ms = envelope
        .as_ref()
        .and_then(|e| {
            e.error.details.iter().find_map(|detail| {
                let is_retry_info = detail
                    .get("@type")
                    .and_then(|t| t.as_str())
                    .is_some_and(|t| t.ends_with("google.rpc.RetryInfo"));
                if !is_retry_info {
                    return None;
                }
                detail
                    .get("retryDelay")
                    .and_then(|d| d.as_str())
                    .and_then(parse_duration_ms)
            })
        })
        .or_else(|| {
            retry_after_header
                .and_then(|h| h.trim().parse::<f64>().ok())
                .and_then(seconds_to_ms)
        });

    LlmError::new(LlmErrorKind::HttpError {
        status_code,
        message,
        retry_after_ms,
    })
}

/// Parses protobuf JSON durations such as `"27s"` or `"1.5s"`.
fn parse_duration_ms(value: &str) -> Option<u64> {
    let secs: f64 = value.trim().strip_suffix('s')?.parse().ok()?;
    seconds_to_ms(secs)
}

/// Negative, infinite and NaN delays are ignored.
fn seconds_to_ms(secs: f64) -> Option<u64> {
    (secs >= 0.0 && secs.is_finite()).then(|| (secs * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration_ms("27s"), Some(27_000));
        assert_eq!(parse_duration_ms("1.5s"), Some(1_500));
        assert_eq!(parse_duration_ms("soon"), None);
        assert_eq!(parse_duration_ms("-3s"), None);
        assert_eq!(parse_duration_ms("infs"), None);
    }
}
