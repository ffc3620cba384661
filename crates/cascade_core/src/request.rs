//! Caller-facing chat request and the generic parameters derived from it.

use crate::Message;
use cascade_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// A chat request submitted to a cascade.
///
/// Unset `max_tokens` and `temperature` fall back to the configured defaults when the
/// request is resolved for a provider. `max_retries` overrides the configured retry bound
/// for every provider tried by this request.
///
/// # Examples
///
/// ```
/// use cascade_core::{ChatRequest, Message};
///
/// let request = ChatRequest::builder()
///     .messages(vec![
///         Message::system("You are a helpful assistant."),
///         Message::user("What is the capital of France?"),
///     ])
///     .max_tokens(300)
///     .temperature(0.8)
///     .max_retries(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 2);
/// assert_eq!(*request.max_tokens(), Some(300));
/// assert!(!request.stream());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    #[builder(setter(into))]
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[builder(setter(strip_option))]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(setter(strip_option))]
    temperature: Option<f32>,
    /// Ask providers for a streamed response
    #[getter(skip)]
    stream: bool,
    /// Retries per provider for this request
    #[builder(setter(strip_option))]
    max_retries: Option<u32>,
}

impl ChatRequest {
    /// Creates a new request builder.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }

    /// Request with the given messages and every option left to configuration.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Whether a streamed response was requested.
    pub fn stream(&self) -> bool {
        self.stream
    }

    /// Checks that the request can be sent to a provider at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the request carries no messages.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.messages.is_empty() {
            return Err(BuilderError::new(BuilderErrorKind::EmptyMessages));
        }
        Ok(())
    }

    /// Resolves this request against defaults for one provider's model.
    pub fn resolve(
        &self,
        model: impl Into<String>,
        default_max_tokens: u32,
        default_temperature: f32,
    ) -> ChatParams {
        ChatParams {
            model: model.into(),
            messages: self.messages.clone(),
            max_tokens: self.max_tokens.unwrap_or(default_max_tokens),
            temperature: self.temperature.unwrap_or(default_temperature),
            stream: self.stream,
        }
    }
}

impl ChatRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.messages {
            Some(messages) if !messages.is_empty() => Ok(()),
            _ => Err(BuilderErrorKind::EmptyMessages.to_string()),
        }
    }
}

impl From<ChatRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: ChatRequestBuilderError) -> Self {
        match err {
            ChatRequestBuilderError::UninitializedField(field) => {
                BuilderError::new(BuilderErrorKind::MissingField(field.to_string()))
            }
            // The only validation rule is a non-empty message list
            ChatRequestBuilderError::ValidationError(_) => {
                BuilderError::new(BuilderErrorKind::EmptyMessages)
            }
        }
    }
}

/// Generic chat parameters for one provider, before provider quirks are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    /// Model identifier of the target provider
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to stream the response
    pub stream: bool,
}
