//! Provider driver traits.

use async_trait::async_trait;
use cascade_core::{ChatCompletionRequest, Completion};
use cascade_error::{CascadeResult, ProviderError};
use cascade_rate_limit::ProviderDescriptor;
use std::sync::Arc;
use std::time::Duration;

/// Core trait every chat-completion backend implements.
///
/// One call is one attempt: drivers never retry or fall back on their own. Failures
/// carry a [`cascade_error::FailureClass`] the orchestrator uses to decide what
/// happens next.
#[async_trait]
pub trait ChatDriver: Send + Sync {
    /// Send one chat completion request.
    async fn chat(&self, request: &ChatCompletionRequest) -> Result<Completion, ProviderError>;

    /// Provider name (e.g. "Groq", "Cerebras").
    fn provider_name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;
}

/// Builds the driver used for one provider.
pub trait DriverFactory: Send + Sync {
    /// Create a driver for `provider` whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    fn create(
        &self,
        provider: &ProviderDescriptor,
        timeout: Duration,
    ) -> CascadeResult<Arc<dyn ChatDriver>>;
}

#[async_trait]
impl<T: ChatDriver + ?Sized> ChatDriver for Arc<T> {
    async fn chat(&self, request: &ChatCompletionRequest) -> Result<Completion, ProviderError> {
        (**self).chat(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
