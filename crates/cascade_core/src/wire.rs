//! OpenAI-compatible chat-completions request body.

use crate::{ChatParams, Message};
use serde::{Deserialize, Serialize};

/// Streaming options understood by OpenAI-compatible endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Emit a final chunk carrying token usage
    pub include_usage: bool,
}

/// Body of `POST {base_url}/chat/completions`.
///
/// # Examples
///
/// ```
/// use cascade_core::{ChatCompletionRequest, ChatParams, Message};
///
/// let params = ChatParams {
///     model: "llama-3.3-70b-versatile".to_string(),
///     messages: vec![Message::user("Hi")],
///     max_tokens: 500,
///     temperature: 0.7,
///     stream: false,
/// };
/// let body = serde_json::to_value(ChatCompletionRequest::from(params)).unwrap();
/// assert_eq!(body["max_tokens"], 500);
/// assert!(body.get("stream_options").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to stream the response as server-sent events
    pub stream: bool,
    /// Extra streaming options, only sent when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl From<ChatParams> for ChatCompletionRequest {
    fn from(params: ChatParams) -> Self {
        Self {
            model: params.model,
            messages: params.messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: params.stream,
            stream_options: None,
        }
    }
}
