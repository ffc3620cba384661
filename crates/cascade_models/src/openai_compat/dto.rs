//! OpenAI-compatible chat completion response bodies.
//!
//! Only the fields a cascade reads are modelled; providers add plenty of others and
//! omit some of these, so everything is defaulted.

use serde::{Deserialize, Serialize};

/// Non-streaming chat completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// Generated completions
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A completion choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    /// The generated message
    #[serde(default)]
    pub message: ChoiceMessage,
}

/// Message in a choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceMessage {
    /// Generated content; null for tool calls and refusals
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Total tokens charged for the call
    #[serde(default)]
    pub total_tokens: u64,
}

/// One server-sent chunk of a streaming response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Delta choices; empty on the trailing usage chunk
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Usage, usually only on the final chunk
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A choice in a streaming chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkChoice {
    /// Incremental content
    #[serde(default)]
    pub delta: Delta,
}

/// Delta content in a streaming chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delta {
    /// Incremental text
    #[serde(default)]
    pub content: Option<String>,
}
