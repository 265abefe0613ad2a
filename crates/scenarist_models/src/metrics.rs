//! OpenTelemetry metrics for gateway calls.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use scenarist_core::TokenUsage;
use scenarist_error::LlmErrorKind;
use std::sync::OnceLock;

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Gateway instruments on the global meter provider.
///
/// Every data point carries `provider`, `model` and `mode` (`text` or
/// `structured`). Without an installed exporter the instruments are no-ops.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Calls, labelled with `outcome` (`ok` or an error class)
    pub calls: Counter<u64>,
    /// Call duration in seconds, retries and limiter waits included
    pub duration: Histogram<f64>,
    /// Tokens, labelled with `direction` (`prompt` or `completion`)
    pub tokens: Counter<u64>,
    /// Attachment payload per call in bytes
    pub attachment_bytes: Histogram<u64>,
}

/// Labels shared by all instruments for one call.
#[derive(Debug, Clone)]
pub struct CallLabels(Vec<KeyValue>);

impl CallLabels {
    /// Labels for a call to `model`; `structured` selects the mode label.
    pub fn new(provider: &'static str, model: &str, structured: bool) -> Self {
        Self(vec![
            KeyValue::new("provider", provider),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("mode", if structured { "structured" } else { "text" }),
        ])
    }

    fn with(&self, key: &'static str, value: &'static str) -> Vec<KeyValue> {
        let mut labels = self.0.clone();
        labels.push(KeyValue::new(key, value));
        labels
    }
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("scenarist_llm");

        Self {
            calls: meter
                .u64_counter("scenarist.llm.calls")
                .with_description("LLM calls by outcome")
                .build(),
            duration: meter
                .f64_histogram("scenarist.llm.duration")
                .with_unit("s")
                .with_description("LLM call duration including retries")
                .build(),
            tokens: meter
                .u64_counter("scenarist.llm.tokens")
                .with_description("Tokens billed by direction")
                .build(),
            attachment_bytes: meter
                .u64_histogram("scenarist.llm.attachment_bytes")
                .with_unit("By")
                .with_description("Attachment payload sent with each call")
                .build(),
        }
    }

    /// The process-wide instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a completed call.
    pub fn record_success(
        &self,
        labels: &CallLabels,
        duration_secs: f64,
        usage: &TokenUsage,
        attachment_bytes: usize,
    ) {
        self.calls.add(1, &labels.with("outcome", "ok"));
        self.duration.record(duration_secs, &labels.0);
        self.attachment_bytes
            .record(attachment_bytes as u64, &labels.0);
        self.tokens
            .add(usage.prompt_tokens, &labels.with("direction", "prompt"));
        self.tokens.add(
            usage.completion_tokens,
            &labels.with("direction", "completion"),
        );
    }

    /// Record a call that failed after retries.
    pub fn record_failure(&self, labels: &CallLabels, duration_secs: f64, kind: &LlmErrorKind) {
        self.calls
            .add(1, &labels.with("outcome", classify_error(kind)));
        self.duration.record(duration_secs, &labels.0);
    }
}

/// Outcome label for an error kind.
///
/// One of `rate_limit`, `auth`, `server`, `timeout`, `network`,
/// `invalid_request`, `blocked`, `invalid_response`, `config`.
pub fn classify_error(kind: &LlmErrorKind) -> &'static str {
    match kind {
        LlmErrorKind::HttpError { status_code, .. } => match *status_code {
            429 => "rate_limit",
            401 | 403 => "auth",
            408 => "timeout",
            500..=599 => "server",
            _ => "invalid_request",
        },
        LlmErrorKind::ApiRequest(_) => "network",
        LlmErrorKind::Blocked(_) => "blocked",
        LlmErrorKind::EmptyResponse | LlmErrorKind::InvalidResponse(_) => "invalid_response",
        LlmErrorKind::MissingApiKey
        | LlmErrorKind::ClientCreation(_)
        | LlmErrorKind::RateLimiterClosed => "config",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        let http = |status_code| LlmErrorKind::HttpError {
            status_code,
            message: String::new(),
            retry_after_ms: None,
        };
        assert_eq!(classify_error(&http(429)), "rate_limit");
        assert_eq!(classify_error(&http(403)), "auth");
        assert_eq!(classify_error(&http(503)), "server");
        assert_eq!(classify_error(&http(400)), "invalid_request");
        assert_eq!(classify_error(&LlmErrorKind::MissingApiKey), "config");
    }

    #[test]
    fn labels_carry_mode() {
        let labels = CallLabels::new("gemini", "gemini-2.5-flash", true);
        let with_outcome = labels.with("outcome", "ok");
        assert_eq!(with_outcome.len(), 4);
        assert_eq!(labels.0[2].value.as_str(), "structured");
    }
}
