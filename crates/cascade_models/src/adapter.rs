//! Per-provider shaping of the chat completion request body.

use cascade_core::{ChatCompletionRequest, ChatParams, StreamOptions};

/// Providers that only report token usage on streamed responses when asked to.
const STREAM_USAGE_PROVIDERS: &[&str] = &["Groq", "Cerebras", "OpenRouter", "Together", "Fireworks"];

/// Build the request body for `provider` from resolved chat parameters.
///
/// Every field maps one-to-one; provider quirks add to that. Unknown providers get
/// the plain mapping.
///
/// # Example
///
/// ```
/// use cascade_core::{ChatParams, Message};
/// use cascade_models::adapt;
///
/// let params = ChatParams {
///     model: "llama-3.3-70b-versatile".to_string(),
///     messages: vec![Message::user("Hi")],
///     max_tokens: 100,
///     temperature: 0.2,
///     stream: true,
/// };
///
/// let body = adapt("Groq", params.clone());
/// assert!(body.stream_options.is_some_and(|o| o.include_usage));
///
/// let body = adapt("Mistral", params);
/// assert!(body.stream_options.is_none());
/// ```
pub fn adapt(provider: &str, params: ChatParams) -> ChatCompletionRequest {
    let stream = params.stream;
    let mut request = ChatCompletionRequest::from(params);

    if stream && STREAM_USAGE_PROVIDERS.contains(&provider) {
        request.stream_options = Some(StreamOptions {
            include_usage: true,
        });
    }

    request
}
