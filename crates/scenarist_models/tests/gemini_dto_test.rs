//! Wire format tests for the Gemini request/response types.

use scenarist_core::{Attachment, AttachmentMime, GenerateRequest};
use scenarist_error::LlmErrorKind;
use scenarist_models::{GeminiRequest, GeminiResponse, Part, parse_error_response};
use serde_json::json;

#[test]
fn test_request_body_shape() {
    let req = GenerateRequest::builder()
        .prompt("Expand the database")
        .attachments(vec![Attachment::new(
            "report.pdf",
            AttachmentMime::Pdf,
            b"%PDF".to_vec(),
        )])
        .web_search(true)
        .thinking(true)
        .build()
        .unwrap();

    let body = serde_json::to_value(GeminiRequest::from_request(&req, "gemini-2.5-flash", None))
        .unwrap();

    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Expand the database");
    assert_eq!(
        body["contents"][0]["parts"][1]["inlineData"],
        json!({"mimeType": "application/pdf", "data": "JVBERg=="})
    );
    assert_eq!(body["generationConfig"]["topP"].as_f64().map(|v| (v * 10.0).round()), Some(8.0));
    assert_eq!(body["generationConfig"]["topK"], 40);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 1024);
    assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
    assert!(body["generationConfig"].get("responseSchema").is_none());
}

#[test]
fn test_thinking_disabled() {
    let req = GenerateRequest::builder().prompt("x").build().unwrap();

    let flash = GeminiRequest::from_request(&req, "gemini-2.5-flash", None);
    assert_eq!(
        flash.generation_config.thinking_config.map(|t| t.thinking_budget),
        Some(0)
    );
    assert!(flash.tools.is_empty());

    // Pro models cannot turn reasoning off, so the field is omitted.
    let pro = GeminiRequest::from_request(&req, "gemini-2.5-pro", None);
    assert!(pro.generation_config.thinking_config.is_none());
}

#[test]
fn test_structured_request_sets_mime_type() {
    let req = GenerateRequest::builder().prompt("x").build().unwrap();
    let schema = json!({"type": "ARRAY", "items": {"type": "STRING"}});

    let body = GeminiRequest::from_request(&req, "gemini-2.5-flash", Some(&schema));
    assert_eq!(
        body.generation_config.response_mime_type.as_deref(),
        Some("application/json")
    );
    assert_eq!(body.generation_config.response_schema, Some(schema));
    assert!(matches!(body.contents[0].parts[0], Part::Text { .. }));
}

#[test]
fn test_response_text_skips_thoughts() {
    let response: GeminiResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"parts": [
                {"text": "weighing the sources...", "thought": true},
                {"text": "1. First hypothesis"},
                {"text": "\n\n2. Second hypothesis"}
            ]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 100,
            "candidatesTokenCount": 20,
            "thoughtsTokenCount": 30,
            "totalTokenCount": 150
        }
    }))
    .unwrap();

    assert_eq!(
        response.text().unwrap(),
        "1. First hypothesis\n\n2. Second hypothesis"
    );
    let usage = response.usage();
    assert_eq!(usage.prompt_tokens, 100);
    assert_eq!(usage.completion_tokens, 50);
    assert_eq!(usage.total_tokens, 150);
}

#[test]
fn test_blocked_and_empty_responses() {
    let blocked: GeminiResponse =
        serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
    assert!(matches!(
        blocked.text().unwrap_err().kind,
        LlmErrorKind::Blocked(ref r) if r == "SAFETY"
    ));

    let empty: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
    assert!(matches!(
        empty.text().unwrap_err().kind,
        LlmErrorKind::EmptyResponse
    ));
}

#[test]
fn test_error_body_with_retry_info() {
    let body = json!({
        "error": {
            "code": 429,
            "message": "You exceeded your current quota",
            "status": "RESOURCE_EXHAUSTED",
            "details": [
                {"@type": "type.googleapis.com/google.rpc.QuotaFailure"},
                {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "27s"}
            ]
        }
    })
    .to_string();

    let err = parse_error_response(429, &body, None);
    match err.kind {
        LlmErrorKind::HttpError {
            status_code,
            message,
            retry_after_ms,
        } => {
            assert_eq!(status_code, 429);
            assert!(message.starts_with("RESOURCE_EXHAUSTED"));
            assert_eq!(retry_after_ms, Some(27_000));
        }
        other => panic!("unexpected kind: {other}"),
    }
}

#[test]
fn test_error_body_plain_text_and_header() {
    let err = parse_error_response(503, "upstream overloaded\n", Some("2"));
    match err.kind {
        LlmErrorKind::HttpError {
            message,
            retry_after_ms,
            ..
        } => {
            assert_eq!(message, "upstream overloaded");
            assert_eq!(retry_after_ms, Some(2_000));
        }
        other => panic!("unexpected kind: {other}"),
    }
}

#[test]
fn test_error_header_rejects_bad_delays() {
    for header in ["-5", "inf", "NaN"] {
        let err = parse_error_response(429, "slow down", Some(header));
        match err.kind {
            LlmErrorKind::HttpError { retry_after_ms, .. } => {
                assert_eq!(retry_after_ms, None, "header {header}");
            }
            other => panic!("unexpected kind: {other}"),
        }
    }
}
