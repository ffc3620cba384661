//! Tests for per-provider request shaping.

use cascade_core::{ChatParams, Message, StreamOptions};
use cascade_models::adapt;

fn params(stream: bool) -> ChatParams {
    ChatParams {
        model: "model-x".to_string(),
        messages: vec![Message::user("Hello"), Message::assistant("Hi"), Message::user("Bye")],
        max_tokens: 256,
        temperature: 0.9,
        stream,
    }
}

#[test]
fn test_fields_map_one_to_one() {
    let body = adapt("Mistral", params(false));

    assert_eq!(body.model, "model-x");
    assert_eq!(body.messages, params(false).messages);
    assert_eq!(body.max_tokens, 256);
    assert_eq!(body.temperature, 0.9);
    assert!(!body.stream);
    assert_eq!(body.stream_options, None);
}

#[test]
fn test_stream_usage_requested_for_quirky_providers() {
    for provider in ["Groq", "Cerebras", "OpenRouter", "Together", "Fireworks"] {
        let body = adapt(provider, params(true));
        assert_eq!(
            body.stream_options,
            Some(StreamOptions {
                include_usage: true
            }),
            "{}",
            provider
        );
    }
}

#[test]
fn test_no_stream_options_without_streaming() {
    assert_eq!(adapt("Groq", params(false)).stream_options, None);
}

#[test]
fn test_unknown_provider_passes_through() {
    let body = adapt("SomethingNew", params(true));

    assert!(body.stream);
    assert_eq!(body.stream_options, None);
    assert_eq!(body.messages.len(), 3);
}

#[test]
fn test_serialized_body_omits_absent_stream_options() {
    let body = serde_json::to_value(adapt("HuggingFace", params(true))).unwrap();

    assert_eq!(body["stream"], true);
    assert!(body.get("stream_options").is_none());
    assert_eq!(body["messages"][1]["role"], "assistant");
}
