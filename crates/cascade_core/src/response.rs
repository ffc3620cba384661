//! Successful completion types.

use serde::{Deserialize, Serialize};

/// What a provider driver returns for one successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Text of the first choice
    pub content: String,
    /// `usage.total_tokens` as reported by the provider, 0 when absent
    pub total_tokens: u64,
}

/// The successful outcome of a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChatResponse {
    /// Generated text
    content: String,
    /// Tokens the provider charged for the call
    tokens_used: u64,
    /// Provider that answered
    provider: String,
    /// Model that answered
    model: String,
}

impl ChatResponse {
    /// Wraps a driver completion with the provider that produced it.
    pub fn new(completion: Completion, provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: completion.content,
            tokens_used: completion.total_tokens,
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Consume the response and return the generated text.
    pub fn into_content(self) -> String {
        self.content
    }
}
