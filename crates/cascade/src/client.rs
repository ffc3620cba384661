//! The cascade orchestrator.
//!
//! [`CascadeClient`] walks its providers in priority order. Each provider is gated by
//! the usage store, paced per minute, and retried with backoff while its failures stay
//! transient; the first success wins and ends the cascade.

use cascade_core::{ChatCompletionRequest, ChatRequest, ChatResponse};
use cascade_error::{
    CascadeError, CascadeResult, ConfigError, ExhaustedError, FailureReason, ProviderError,
    ProviderFailure, RetryableError,
};
use cascade_interface::{ChatDriver, DriverFactory};
use cascade_models::{CascadeMetrics, OpenAICompatibleFactory, adapt};
use cascade_rate_limit::{
    BackoffPolicy, CascadeConfig, ProviderDescriptor, ProviderRegistry, RequestPacer, UsageReport,
    UsageStore,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// One provider as the orchestrator sees it.
struct ProviderSlot {
    descriptor: ProviderDescriptor,
    driver: Arc<dyn ChatDriver>,
    pacer: RequestPacer,
}

/// Why a single attempt did not produce a response.
enum AttemptFailure {
    LimitReached,
    Provider(ProviderError),
}

/// Outcome of probing one provider on its own.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Provider name
    pub provider: String,
    /// Its response, or why it failed
    pub outcome: Result<ChatResponse, FailureReason>,
}

/// Resilient chat completions over an ordered list of providers.
///
/// The client is `Send + Sync`; share it behind an `Arc` to run cascades from
/// several tasks at once. Usage accounting is serialized by the usage store.
///
/// # Example
///
/// ```no_run
/// use cascade::{CascadeClient, ChatRequest, Message};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CascadeClient::builder().build().await?;
///
/// let request = ChatRequest::new(vec![
///     Message::system("You are a helpful assistant."),
///     Message::user("What is the capital of France?"),
/// ]);
/// let response = client.complete(&request).await?;
/// println!("{} ({}): {}", response.provider(), response.model(), response.content());
/// println!("{}", client.usage_stats().await);
/// # Ok(())
/// # }
/// ```
pub struct CascadeClient {
    config: CascadeConfig,
    backoff: BackoffPolicy,
    store: UsageStore,
    slots: Vec<ProviderSlot>,
}

impl fmt::Debug for CascadeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeClient")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("providers", &self.available_provider_names())
            .finish()
    }
}

impl CascadeClient {
    /// Creates a new client builder.
    pub fn builder() -> CascadeClientBuilder {
        CascadeClientBuilder::default()
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Usage store gating this client's providers.
    pub fn usage_store(&self) -> &UsageStore {
        &self.store
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.slots.iter().map(|slot| &slot.descriptor)
    }

    /// Names of the providers in the order they are tried.
    pub fn available_provider_names(&self) -> Vec<String> {
        self.providers().map(|p| p.name().clone()).collect()
    }

    /// Today's usage for every provider of this client.
    pub async fn usage_stats(&self) -> UsageReport {
        let providers: Vec<ProviderDescriptor> = self.providers().cloned().collect();
        self.store.usage_stats(&providers).await
    }

    /// Run a cascade: try each provider in order until one answers.
    ///
    /// Dropping the returned future abandons the cascade; counters already recorded
    /// stay recorded.
    ///
    /// # Errors
    ///
    /// - A builder error if the request has no messages; no provider is contacted.
    /// - An exhausted error listing every provider and why it failed.
    #[instrument(skip(self, request), fields(messages = request.messages().len(), stream = request.stream()))]
    pub async fn complete(&self, request: &ChatRequest) -> CascadeResult<ChatResponse> {
        request.validate()?;

        let max_retries = request
            .max_retries()
            .unwrap_or(*self.config.default_max_retries());
        let mut failures = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            let name = slot.descriptor.name();
            match self.run_provider(slot, request, max_retries).await {
                Ok(response) => {
                    info!(
                        provider = %name,
                        tokens = response.tokens_used(),
                        "Cascade succeeded"
                    );
                    return Ok(response);
                }
                Err(reason) => {
                    warn!(provider = %name, reason = %reason, "Falling through to next provider");
                    CascadeMetrics::get().record_fallthrough(name, reason_label(&reason));
                    failures.push(ProviderFailure::new(name.clone(), reason));
                }
            }
        }

        let err = ExhaustedError::new(failures);
        warn!(providers = err.provider_count(), "All providers failed");
        Err(err.into())
    }

    /// Same as [`CascadeClient::complete`], abandoned as soon as `token` is cancelled.
    ///
    /// Cancellation takes effect mid-backoff and mid-request.
    ///
    /// # Errors
    ///
    /// Everything [`CascadeClient::complete`] returns, plus a cancelled error.
    pub async fn complete_with_cancellation(
        &self,
        request: &ChatRequest,
        token: &CancellationToken,
    ) -> CascadeResult<ChatResponse> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Cascade cancelled");
                Err(CascadeError::cancelled())
            }
            result = self.complete(request) => result,
        }
    }

    /// Send `request` to every provider on its own, with the usual gating and retries.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the request has no messages.
    #[instrument(skip(self, request))]
    pub async fn probe(&self, request: &ChatRequest) -> CascadeResult<Vec<ProbeResult>> {
        request.validate()?;

        let max_retries = request
            .max_retries()
            .unwrap_or(*self.config.default_max_retries());
        let mut results = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            let outcome = self.run_provider(slot, request, max_retries).await;
            debug!(provider = %slot.descriptor.name(), ok = outcome.is_ok(), "Probed provider");
            results.push(ProbeResult {
                provider: slot.descriptor.name().clone(),
                outcome,
            });
        }
        Ok(results)
    }

    /// Attempts against one provider, up to `max_retries + 1` of them.
    #[instrument(skip(self, slot, request), fields(provider = %slot.descriptor.name()))]
    async fn run_provider(
        &self,
        slot: &ProviderSlot,
        request: &ChatRequest,
        max_retries: u32,
    ) -> Result<ChatResponse, FailureReason> {
        let params = request.resolve(
            slot.descriptor.model(),
            *self.config.default_max_tokens(),
            *self.config.default_temperature(),
        );
        let body = adapt(slot.descriptor.name(), params);

        let attempts = AtomicU32::new(0);
        let attempts_ref = &attempts;
        let body_ref = &body;
        let schedule = self.backoff.schedule().take(max_retries as usize);

        let result = Retry::spawn(schedule, move || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst);
            self.attempt(slot, body_ref, attempt, max_retries).await
        })
        .await;

        match result {
            Ok(response) => Ok(response),
            Err(AttemptFailure::LimitReached) => Err(FailureReason::LimitReached),
            Err(AttemptFailure::Provider(e)) if e.is_retryable() => {
                Err(FailureReason::RetriesExhausted {
                    attempts: attempts.load(Ordering::SeqCst),
                    last_error: e.kind.to_string(),
                })
            }
            Err(AttemptFailure::Provider(e)) => Err(FailureReason::Fatal {
                error: e.kind.to_string(),
            }),
        }
    }

    /// One gated, paced, accounted call to a provider.
    async fn attempt(
        &self,
        slot: &ProviderSlot,
        body: &ChatCompletionRequest,
        attempt: u32,
        max_retries: u32,
    ) -> Result<ChatResponse, RetryError<AttemptFailure>> {
        let name = slot.descriptor.name();

        if !self.store.check_limit(&slot.descriptor).await {
            info!(provider = %name, "Skipping provider at its daily limit");
            return Err(RetryError::Permanent(AttemptFailure::LimitReached));
        }

        slot.pacer.until_ready().await;
        debug!(provider = %name, attempt, "Sending request");

        match slot.driver.chat(body).await {
            Ok(completion) => {
                self.store
                    .update(name, 1, completion.total_tokens)
                    .await;
                Ok(ChatResponse::new(
                    completion,
                    name.clone(),
                    slot.driver.model_name(),
                ))
            }
            Err(e) => {
                if e.kind.reached_provider() {
                    self.store.update(name, 1, e.kind.tokens_charged()).await;
                }

                if e.is_retryable() {
                    if attempt < max_retries {
                        warn!(
                            provider = %name,
                            attempt,
                            class = %e.class(),
                            delay_secs = self.backoff.delay(attempt).as_secs(),
                            error = %e.kind,
                            "Transient failure, retrying after backoff"
                        );
                    } else {
                        warn!(provider = %name, attempt, error = %e.kind, "Transient failure, retries exhausted");
                    }
                    Err(RetryError::Transient {
                        err: AttemptFailure::Provider(e),
                        retry_after: None,
                    })
                } else {
                    warn!(provider = %name, attempt, class = %e.class(), error = %e.kind, "Fatal failure for provider");
                    Err(RetryError::Permanent(AttemptFailure::Provider(e)))
                }
            }
        }
    }
}

fn reason_label(reason: &FailureReason) -> &'static str {
    match reason {
        FailureReason::LimitReached => "limit_reached",
        FailureReason::RetriesExhausted { .. } => "retries_exhausted",
        FailureReason::Fatal { .. } => "fatal",
    }
}

/// Builder for [`CascadeClient`].
///
/// Anything left unset is taken from the environment: configuration from
/// [`CascadeConfig::load`], providers from [`ProviderRegistry::from_env`], the usage
/// store from the configured tracking file and HTTP drivers for every provider.
#[derive(Default)]
pub struct CascadeClientBuilder {
    config: Option<CascadeConfig>,
    providers: Option<Vec<ProviderDescriptor>>,
    registry: Option<ProviderRegistry>,
    usage_store: Option<UsageStore>,
    driver_factory: Option<Arc<dyn DriverFactory>>,
}

impl CascadeClientBuilder {
    /// Use this configuration instead of loading one.
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Cascade over exactly these providers, in this order.
    pub fn with_providers(mut self, providers: Vec<ProviderDescriptor>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Take the available providers of this registry.
    ///
    /// Ignored when explicit providers are set.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Account usage in this store.
    pub fn with_usage_store(mut self, store: UsageStore) -> Self {
        self.usage_store = Some(store);
        self
    }

    /// Build provider drivers with this factory.
    pub fn with_driver_factory(mut self, factory: impl DriverFactory + 'static) -> Self {
        self.driver_factory = Some(Arc::new(factory));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no provider is left to cascade over, if the
    /// configuration cannot be loaded, or if a driver cannot be created.
    #[instrument(skip(self))]
    pub async fn build(self) -> CascadeResult<CascadeClient> {
        let config = match self.config {
            Some(config) => config,
            None => CascadeConfig::load()?,
        };

        let providers = match self.providers {
            Some(providers) => providers,
            None => self
                .registry
                .unwrap_or_else(ProviderRegistry::from_env)
                .list_available(),
        };
        if providers.is_empty() {
            return Err(ConfigError::new(
                "No API providers available. Set at least one provider API key.",
            )
            .into());
        }

        let store = match self.usage_store {
            Some(store) => store,
            None => UsageStore::from_config(&config).await,
        };
        let factory = self
            .driver_factory
            .unwrap_or_else(|| Arc::new(OpenAICompatibleFactory));

        let timeout = config.request_timeout_duration();
        let slots = providers
            .into_iter()
            .map(|descriptor| -> CascadeResult<ProviderSlot> {
                let driver = factory.create(&descriptor, timeout)?;
                let pacer = RequestPacer::new(*descriptor.requests_per_minute());
                Ok(ProviderSlot {
                    descriptor,
                    driver,
                    pacer,
                })
            })
            .collect::<CascadeResult<Vec<_>>>()?;

        info!(
            providers = ?slots.iter().map(|s| s.descriptor.name().as_str()).collect::<Vec<_>>(),
            "Cascade client ready"
        );

        Ok(CascadeClient {
            backoff: config.backoff_policy(),
            config,
            store,
            slots,
        })
    }
}
