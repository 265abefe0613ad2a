//! Google Gemini REST API.

mod client;
mod dto;

pub use client::GeminiClient;
pub use dto::{
    Candidate, CandidateContent, Content, GeminiRequest, GeminiResponse, GenerationConfig,
    GoogleSearch, InlineData, Part, PromptFeedback, ResponsePart, ThinkingConfig, Tool,
    UsageMetadata, parse_error_response,
};
