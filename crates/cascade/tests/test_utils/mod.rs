//! Test utilities for cascade tests.
//!
//! This module provides a scripted mock driver and a factory handing it out.

use async_trait::async_trait;
use cascade::{
    CascadeConfig, CascadeResult, ChatCompletionRequest, ChatDriver, ChatRequest, Completion,
    ConfigError, DriverFactory, Message, ProviderDescriptor, ProviderError, ProviderErrorKind,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What a mock driver does on one call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer with this text and token count
    Success(&'static str, u64),
    /// Fail with this error
    Failure(ProviderErrorKind),
}

impl MockResponse {
    pub fn http(status: u16) -> Self {
        MockResponse::Failure(ProviderErrorKind::from_status(status, "mock"))
    }
}

/// Driver that replays a script of responses; the last one repeats forever.
pub struct MockDriver {
    provider: String,
    model: String,
    script: Mutex<VecDeque<MockResponse>>,
    last: Mutex<Option<MockResponse>>,
    calls: Mutex<Vec<(Instant, ChatCompletionRequest)>>,
}

impl MockDriver {
    pub fn new(provider: &str, script: Vec<MockResponse>) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            model: format!("{}-model", provider.to_lowercase()),
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(provider: &str, response: MockResponse) -> Arc<Self> {
        Self::new(provider, vec![response])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].0 - w[0].0).collect()
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn next_response(&self) -> MockResponse {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = script.pop_front() {
            *last = Some(next.clone());
            next
        } else {
            last.clone()
                .unwrap_or(MockResponse::Failure(ProviderErrorKind::Unexpected(
                    "empty script".to_string(),
                )))
        }
    }
}

#[async_trait]
impl ChatDriver for MockDriver {
    async fn chat(&self, request: &ChatCompletionRequest) -> Result<Completion, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));

        match self.next_response() {
            MockResponse::Success(content, total_tokens) => Ok(Completion {
                content: content.to_string(),
                total_tokens,
            }),
            MockResponse::Failure(kind) => Err(ProviderError::new(&self.provider, kind)),
        }
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Hands out pre-built mock drivers by provider name.
#[derive(Default)]
pub struct MockFactory {
    drivers: HashMap<String, Arc<MockDriver>>,
}

impl MockFactory {
    pub fn new(drivers: &[&Arc<MockDriver>]) -> Self {
        Self {
            drivers: drivers
                .iter()
                .map(|d| (d.provider_name().to_string(), Arc::clone(d)))
                .collect(),
        }
    }
}

impl DriverFactory for MockFactory {
    fn create(
        &self,
        provider: &ProviderDescriptor,
        _timeout: Duration,
    ) -> CascadeResult<Arc<dyn ChatDriver>> {
        match self.drivers.get(provider.name()) {
            Some(driver) => Ok(driver.clone()),
            None => Err(ConfigError::new(format!("no mock for {}", provider.name())).into()),
        }
    }
}

/// Provider with the given daily request cap and a generous token cap.
pub fn provider(name: &str, daily_limit: u64) -> ProviderDescriptor {
    ProviderDescriptor::new(
        name,
        format!("http://{}.invalid/v1", name.to_lowercase()),
        "test-key",
        format!("{}-model", name.to_lowercase()),
        daily_limit,
        100_000,
    )
}

/// Configuration with a 2s backoff base, a 60s cap and `max_retries` retries.
pub fn config(max_retries: u32) -> CascadeConfig {
    CascadeConfig::default()
        .with_default_max_retries(max_retries)
        .with_base_backoff_delay(2)
        .with_max_backoff_delay(60)
        .with_log_file("")
}

pub fn hello() -> ChatRequest {
    ChatRequest::new(vec![Message::user("Hello")])
}
