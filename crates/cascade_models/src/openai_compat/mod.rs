//! Client for OpenAI-compatible chat completion endpoints.
//!
//! Every built-in provider speaks this dialect, so one client serves them all; the
//! request adapter handles the per-provider differences in the body.

mod dto;
mod sse;

pub use dto::{
    ChatCompletionChunk, ChatCompletionResponse, Choice, ChoiceMessage, ChunkChoice, Delta, Usage,
};
pub use sse::SseAccumulator;

use crate::CascadeMetrics;
use async_trait::async_trait;
use cascade_core::{ChatCompletionRequest, Completion};
use cascade_error::{CascadeResult, ConfigError, ProviderError, ProviderErrorKind};
use cascade_interface::{ChatDriver, DriverFactory};
use cascade_rate_limit::ProviderDescriptor;
use futures_util::StreamExt;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// HTTP client for one provider's `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    provider: String,
    model: String,
    url: String,
    api_key: String,
}

impl fmt::Debug for OpenAICompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAICompatibleClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl OpenAICompatibleClient {
    /// Creates a client posting to `url` with a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be initialized.
    #[instrument(skip(api_key, url), fields(url = %url.as_ref()))]
    pub fn new(
        provider: &str,
        model: &str,
        url: impl AsRef<str>,
        api_key: &str,
        timeout: Duration,
    ) -> CascadeResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ConfigError::new(format!("Failed to build HTTP client for {}: {}", provider, e))
        })?;

        debug!("Created OpenAI-compatible client");
        Ok(Self {
            client,
            provider: provider.to_string(),
            model: model.to_string(),
            url: url.as_ref().to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Creates a client for a registry provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be initialized.
    pub fn from_descriptor(provider: &ProviderDescriptor, timeout: Duration) -> CascadeResult<Self> {
        Self::new(
            provider.name(),
            provider.model(),
            provider.chat_completions_url(),
            provider.api_key(),
            timeout,
        )
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    #[track_caller]
    fn error(&self, kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new(&self.provider, kind)
    }

    #[track_caller]
    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        let kind = if e.is_timeout() {
            ProviderErrorKind::Timeout(e.to_string())
        } else if e.is_decode() {
            ProviderErrorKind::ResponseParsing(e.to_string())
        } else {
            ProviderErrorKind::Network(e.to_string())
        };
        self.error(kind)
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<Completion, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            debug!(status = status.as_u16(), "Provider returned error status");
            return Err(self.error(ProviderErrorKind::from_status(status.as_u16(), message)));
        }

        let completion = if request.stream {
            self.read_stream(response).await?
        } else {
            self.read_json(response).await?
        };

        if completion.content.trim().is_empty() {
            return Err(self.error(ProviderErrorKind::EmptyCompletion {
                total_tokens: completion.total_tokens,
            }));
        }
        Ok(completion)
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Completion, ProviderError> {
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let body: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            self.error(ProviderErrorKind::ResponseParsing(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(Completion {
            content,
            total_tokens: body.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }

    async fn read_stream(&self, response: reqwest::Response) -> Result<Completion, ProviderError> {
        let mut accumulator = SseAccumulator::default();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let bytes = chunk.map_err(|e| self.transport_error(e))?;
            accumulator.push(&bytes).map_err(|kind| self.error(kind))?;
            if accumulator.is_done() {
                break;
            }
        }

        debug!(
            chars = accumulator.content().len(),
            done = accumulator.is_done(),
            "Finished reading stream"
        );
        Ok(accumulator.finish())
    }
}

#[async_trait]
impl ChatDriver for OpenAICompatibleClient {
    #[instrument(skip(self, request), fields(provider = %self.provider, model = %self.model, stream = request.stream))]
    async fn chat(&self, request: &ChatCompletionRequest) -> Result<Completion, ProviderError> {
        let started = Instant::now();
        let result = self.send(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        let metrics = CascadeMetrics::get();
        match &result {
            Ok(completion) => {
                debug!(tokens = completion.total_tokens, "Provider call succeeded");
                metrics.record_success(&self.provider, &self.model, elapsed, completion.total_tokens);
            }
            Err(e) => {
                debug!(error = %e.kind, class = %e.class(), "Provider call failed");
                metrics.record_failure(&self.provider, &self.model, elapsed, e.class());
            }
        }
        result
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds an [`OpenAICompatibleClient`] for each provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAICompatibleFactory;

impl DriverFactory for OpenAICompatibleFactory {
    fn create(
        &self,
        provider: &ProviderDescriptor,
        timeout: Duration,
    ) -> CascadeResult<Arc<dyn ChatDriver>> {
        Ok(Arc::new(OpenAICompatibleClient::from_descriptor(
            provider, timeout,
        )?))
    }
}
