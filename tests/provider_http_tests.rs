//! Provider clients against a mock upstream: wire formats, error-body
//! handling and how upstream statuses feed the failure taxonomy.

use newsdesk_gateway::config::ProviderSettings;
use newsdesk_gateway::core::classify::classify;
use newsdesk_gateway::core::providers::{
    AnthropicProvider, GenerativeProvider, OpenAiProvider, ProviderError, ProviderRequest,
};
use newsdesk_gateway::core::ErrorKind;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(name: &str, base_url: &str) -> ProviderSettings {
    ProviderSettings {
        name: name.to_string(),
        api_key: "sk-test".to_string(),
        base_url: Some(base_url.to_string()),
        primary_model: "primary".to_string(),
        fallback_model: None,
    }
}

fn request(model: &str) -> ProviderRequest {
    ProviderRequest {
        model: model.to_string(),
        prompt: "Summarize the council meeting".to_string(),
        temperature: 0.2,
        max_output_tokens: 64,
    }
}

#[tokio::test]
async fn openai_success_parses_text_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "The council met." } }],
            "model": "gpt-4o-2024-08-06",
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let response = provider.generate(&request("gpt-4o")).await.unwrap();

    assert_eq!(response.text, "The council met.");
    assert_eq!(response.model, "gpt-4o-2024-08-06");
    assert_eq!(response.usage.total_tokens, 16);
}

#[tokio::test]
async fn openai_401_reads_the_nested_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let error = provider.generate(&request("gpt-4o")).await.unwrap_err();

    assert!(matches!(error, ProviderError::Authentication { .. }));
    assert!(error.to_string().contains("Incorrect API key provided"));

    let classified = classify(&error);
    assert_eq!(classified.kind, ErrorKind::Auth);
    assert!(!classified.retryable);
    assert!(classified.failover_eligible);
}

#[tokio::test]
async fn openai_429_carries_the_retry_after_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({ "error": { "message": "Rate limit reached" } })),
        )
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let error = provider.generate(&request("gpt-4o")).await.unwrap_err();

    assert!(matches!(
        error,
        ProviderError::RateLimit { retry_after: Some(7), .. }
    ));
    assert_eq!(classify(&error).kind, ErrorKind::RateLimit);
}

#[tokio::test]
async fn openai_404_means_the_model_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "The model `gpt-unknown` does not exist" }
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let error = provider.generate(&request("gpt-unknown")).await.unwrap_err();

    assert!(matches!(error, ProviderError::ModelNotAvailable { .. }));
    let classified = classify(&error);
    assert_eq!(classified.kind, ErrorKind::ModelUnsupported);
    assert!(!classified.retryable);
    assert!(classified.failover_eligible);
}

#[tokio::test]
async fn openai_500_classifies_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let error = provider.generate(&request("gpt-4o")).await.unwrap_err();

    assert_eq!(error.status(), Some(500));
    let classified = classify(&error);
    assert_eq!(classified.kind, ErrorKind::Transient);
    assert!(classified.retryable);
}

#[tokio::test]
async fn openai_unreadable_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::from_settings(&settings("openai", &server.uri())).unwrap();
    let error = provider.generate(&request("gpt-4o")).await.unwrap_err();

    assert!(matches!(error, ProviderError::MalformedResponse { .. }));
    // Treated as a proxy hiccup: worth retrying
    assert_eq!(classify(&error).kind, ErrorKind::Transient);
}

#[tokio::test]
async fn anthropic_success_joins_content_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "The council " },
                { "type": "text", "text": "met on Tuesday." }
            ],
            "model": "claude-3-5-sonnet-20241022",
            "usage": { "input_tokens": 9, "output_tokens": 6 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        AnthropicProvider::from_settings(&settings("anthropic", &server.uri())).unwrap();
    let response = provider.generate(&request("claude-3-5-sonnet-20241022")).await.unwrap();

    assert_eq!(response.text, "The council met on Tuesday.");
    assert_eq!(response.usage.prompt_tokens, 9);
    assert_eq!(response.usage.completion_tokens, 6);
    assert_eq!(response.usage.total_tokens, 15);
}

#[tokio::test]
async fn anthropic_429_maps_like_openai() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Number of requests has exceeded your rate limit" }
        })))
        .mount(&server)
        .await;

    let provider =
        AnthropicProvider::from_settings(&settings("anthropic", &server.uri())).unwrap();
    let error = provider.generate(&request("claude-3-5-haiku-20241022")).await.unwrap_err();

    assert!(matches!(error, ProviderError::RateLimit { .. }));
    assert_eq!(error.provider(), "anthropic");
}
