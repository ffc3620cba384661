//! Tests for the OpenAI-compatible HTTP client against a local mock server.

use cascade_core::{ChatCompletionRequest, ChatParams, Message};
use cascade_error::{FailureClass, ProviderErrorKind};
use cascade_interface::{ChatDriver, DriverFactory};
use cascade_models::{OpenAICompatibleClient, OpenAICompatibleFactory, adapt};
use cascade_rate_limit::ProviderDescriptor;
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn request(stream: bool) -> ChatCompletionRequest {
    adapt(
        "Groq",
        ChatParams {
            model: "test-model".to_string(),
            messages: vec![Message::system("Be brief."), Message::user("Hi")],
            max_tokens: 64,
            temperature: 0.5,
            stream,
        },
    )
}

fn client(server: &mockito::Server) -> OpenAICompatibleClient {
    OpenAICompatibleClient::new(
        "Groq",
        "test-model",
        format!("{}/chat/completions", server.url()),
        "test-key",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_successful_completion() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "max_tokens": 64,
            "stream": false,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "cmpl-1",
                "object": "chat.completion",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let completion = client(&server).chat(&request(false)).await?;

    assert_eq!(completion.content, "Hello!");
    assert_eq!(completion.total_tokens, 13);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_missing_usage_counts_zero_tokens() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"content": "ok"}}]}"#)
        .create_async()
        .await;

    let completion = client(&server).chat(&request(false)).await?;

    assert_eq!(completion.content, "ok");
    assert_eq!(completion.total_tokens, 0);
    Ok(())
}

#[tokio::test]
async fn test_status_codes_map_to_failure_classes() {
    let cases = [
        (429, FailureClass::RateLimited),
        (500, FailureClass::ProviderError),
        (503, FailureClass::ProviderError),
        (408, FailureClass::ProviderError),
        (400, FailureClass::Unexpected),
        (401, FailureClass::Unexpected),
        (403, FailureClass::Unexpected),
        (404, FailureClass::Unexpected),
        (422, FailureClass::Unexpected),
    ];

    for (status, expected) in cases {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_body("nope")
            .create_async()
            .await;

        let err = client(&server).chat(&request(false)).await.unwrap_err();

        assert_eq!(err.class(), expected, "status {}", status);
        assert_eq!(err.provider, "Groq");
        assert!(err.kind.reached_provider(), "status {}", status);
    }
}

#[tokio::test]
async fn test_rate_limit_keeps_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let err = client(&server).chat(&request(false)).await.unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::RateLimited("slow down".to_string()));
}

#[tokio::test]
async fn test_unparseable_body_is_unexpected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client(&server).chat(&request(false)).await.unwrap_err();

    assert!(matches!(err.kind, ProviderErrorKind::ResponseParsing(_)));
    assert_eq!(err.class(), FailureClass::Unexpected);
}

#[tokio::test]
async fn test_empty_completion_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [], "usage": {"total_tokens": 5}}"#)
        .create_async()
        .await;

    let err = client(&server).chat(&request(false)).await.unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::EmptyCompletion { total_tokens: 5 });
    assert_eq!(err.kind.tokens_charged(), 5);
    assert_eq!(err.class(), FailureClass::ProviderError);
}

#[tokio::test]
async fn test_streamed_completion_is_accumulated() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Stream\"}}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ed!\"}}]}\n\n",
        "data: {\"choices\":[],\"usage\":{\"total_tokens\":21}}\n\n",
        "data: [DONE]\n\n",
    );
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "stream": true,
            "stream_options": {"include_usage": true}
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let completion = client(&server).chat(&request(true)).await?;

    assert_eq!(completion.content, "Streamed!");
    assert_eq!(completion.total_tokens, 21);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = OpenAICompatibleClient::new(
        "Groq",
        "test-model",
        "http://127.0.0.1:1/chat/completions",
        "test-key",
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client.chat(&request(false)).await.unwrap_err();

    assert!(matches!(err.kind, ProviderErrorKind::Network(_)));
    assert_eq!(err.class(), FailureClass::ProviderError);
    assert!(!err.kind.reached_provider());
}

#[tokio::test]
async fn test_factory_builds_driver_from_descriptor() {
    let provider = ProviderDescriptor::new(
        "Cerebras",
        "https://api.cerebras.ai/v1",
        "csk-test",
        "llama-3.3-70b-instruct",
        1000,
        60000,
    );

    let driver = OpenAICompatibleFactory
        .create(&provider, Duration::from_secs(60))
        .unwrap();

    assert_eq!(driver.provider_name(), "Cerebras");
    assert_eq!(driver.model_name(), "llama-3.3-70b-instruct");
}

#[test]
fn test_debug_hides_credential() {
    let client = OpenAICompatibleClient::new(
        "Groq",
        "m",
        "https://example.invalid/chat/completions",
        "secret-key",
        Duration::from_secs(1),
    )
    .unwrap();

    assert!(!format!("{:?}", client).contains("secret-key"));
    assert_eq!(client.url(), "https://example.invalid/chat/completions");
}
