//! HTTP-level tests for the Gemini adapter against a mock server.

use api_lib::adapters::GeminiAdapter;
use coursecraft_core::ports::{GenerationProvider, GenerationRequest, PortError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> GeminiAdapter {
    GeminiAdapter::new(
        reqwest::Client::new(),
        "test-key".to_string(),
        "gemini-2.5-flash".to_string(),
        Some(server.uri()),
    )
}

#[tokio::test]
async fn returns_the_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"title\": "}, {"text": "\"X\"}"}]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = adapter_for(&server)
        .generate(&GenerationRequest::new("prompt"))
        .await
        .unwrap();
    assert_eq!(text, "{\"title\": \"X\"}");
}

#[tokio::test]
async fn non_success_status_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = adapter_for(&server)
        .generate(&GenerationRequest::new("prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Provider(_)));
}

#[tokio::test]
async fn empty_candidate_list_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = adapter_for(&server)
        .generate(&GenerationRequest::new("prompt"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Provider(_)));
}
