//! Scripted LLM driver for workflow tests.

use async_trait::async_trait;
use scenarist_core::{GenerateRequest, GenerateResponse, TokenUsage};
use scenarist_error::{LlmError, LlmErrorKind, ScenaristResult};
use scenarist_interface::{LlmDriver, StructuredResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return the text with fixed usage (10 prompt, 5 completion tokens)
    Text(String),
    /// Fail with a 500 from the provider
    Fail,
}

/// Answers calls from a queue and records every request it saw.
///
/// Running out of replies fails the call, so tests notice unexpected calls.
pub struct ScriptedDriver {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<GenerateRequest>>,
    schemas: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedDriver {
    /// Driver answering with `texts` in order.
    pub fn new<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::with_replies(texts.into_iter().map(|t| MockReply::Text(t.into())))
    }

    /// Driver answering with arbitrary replies in order.
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Schemas passed to structured calls.
    pub fn schemas(&self) -> Vec<serde_json::Value> {
        self.schemas.lock().unwrap().clone()
    }

    /// Replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(&self, req: &GenerateRequest) -> ScenaristResult<String> {
        self.requests.lock().unwrap().push(req.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail) => Err(LlmError::new(LlmErrorKind::HttpError {
                status_code: 500,
                message: "scripted failure".to_string(),
                retry_after_ms: None,
            })
            .into()),
            None => Err(LlmError::new(LlmErrorKind::EmptyResponse).into()),
        }
    }
}

#[async_trait]
impl LlmDriver for ScriptedDriver {
    async fn call_llm(&self, req: &GenerateRequest) -> ScenaristResult<GenerateResponse> {
        let text = self.next(req)?;
        Ok(GenerateResponse {
            text,
            usage: TokenUsage::new(10, 5),
        })
    }

    async fn structured_call_llm(
        &self,
        req: &GenerateRequest,
        schema: &serde_json::Value,
    ) -> ScenaristResult<StructuredResponse> {
        self.schemas.lock().unwrap().push(schema.clone());
        let text = self.next(req)?;
        Ok(StructuredResponse::from_text(text, TokenUsage::new(10, 5)))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
