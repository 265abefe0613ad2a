//! LLM provider integrations for Scenarist.
//!
//! The Gemini client speaks the `generateContent` REST API directly so that a
//! single call can carry inline documents, a response schema, the Google
//! Search grounding tool and a thinking budget.
//!
//! ```no_run
//! use scenarist_core::GenerateRequest;
//! use scenarist_interface::LlmDriver;
//! use scenarist_models::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new()?;
//! let request = GenerateRequest::builder()
//!     .prompt("List three forgotten inventions of the 1920s.")
//!     .build()?;
//! let response = client.call_llm(&request).await?;
//! println!("{} ({} tokens)", response.text, response.usage.total_tokens);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metrics;

pub use metrics::{CallLabels, LlmMetrics, classify_error};

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{
    Candidate, CandidateContent, Content, GeminiClient, GeminiRequest, GeminiResponse,
    GenerationConfig, GoogleSearch, InlineData, Part, PromptFeedback, ResponsePart,
    ThinkingConfig, Tool, UsageMetadata, parse_error_response,
};
