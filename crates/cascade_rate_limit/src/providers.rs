//! Built-in provider table and credential-based availability.
//!
//! Providers are tried in the order they appear in [`ProviderRegistry::list_all`].
//! A provider whose credential variable is unset or blank is simply unavailable.

use std::fmt;
use tracing::debug;

/// One interchangeable chat-completion backend and its caps.
///
/// Descriptors are built once at startup and never mutated by the cascade.
#[derive(Clone, PartialEq, Eq, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ProviderDescriptor {
    /// Unique provider name (e.g. "Groq")
    #[setters(skip)]
    name: String,

    /// Base URL of the OpenAI-compatible API, without trailing `/chat/completions`
    #[setters(skip)]
    base_url: String,

    /// Bearer credential; blank means unavailable
    #[getter(skip)]
    #[setters(into)]
    api_key: String,

    /// Model identifier sent in every request
    #[setters(into)]
    model: String,

    /// Maximum requests per calendar day
    daily_request_limit: u64,

    /// Per-minute token cap, also the basis of the daily token budget
    token_limit_per_minute: u64,

    /// Per-minute request cap used for pacing; 0 disables pacing
    requests_per_minute: u32,
}

impl ProviderDescriptor {
    /// Create a descriptor with no pacing.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        daily_request_limit: u64,
        token_limit_per_minute: u64,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            daily_request_limit,
            token_limit_per_minute,
            requests_per_minute: 0,
        }
    }

    /// Credential sent as the bearer token.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether a non-blank credential is configured.
    pub fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Daily token budget, taken as the per-minute cap sustained for a whole day.
    pub fn daily_token_budget(&self) -> u64 {
        self.token_limit_per_minute.saturating_mul(1440)
    }

    /// Full URL of the chat completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &if self.is_available() { "<redacted>" } else { "<unset>" })
            .field("model", &self.model)
            .field("daily_request_limit", &self.daily_request_limit)
            .field("token_limit_per_minute", &self.token_limit_per_minute)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

struct BuiltinProvider {
    name: &'static str,
    base_url: &'static str,
    env_var: &'static str,
    model: &'static str,
    daily_request_limit: u64,
    token_limit_per_minute: u64,
    requests_per_minute: u32,
}

const BUILTIN: &[BuiltinProvider] = &[
    BuiltinProvider {
        name: "Groq",
        base_url: "https://api.groq.com/openai/v1",
        env_var: "GROQ_API_KEY",
        model: "llama-3.3-70b-versatile",
        daily_request_limit: 1000,
        token_limit_per_minute: 6000,
        requests_per_minute: 30,
    },
    BuiltinProvider {
        name: "Cerebras",
        base_url: "https://api.cerebras.ai/v1",
        env_var: "CEREBRAS_API_KEY",
        model: "llama-3.3-70b-instruct",
        daily_request_limit: 1000,
        token_limit_per_minute: 60000,
        requests_per_minute: 60,
    },
    BuiltinProvider {
        name: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        env_var: "OPENROUTER_API_KEY",
        model: "meta-llama/llama-3.3-70b-instruct:free",
        daily_request_limit: 200,
        token_limit_per_minute: 20000,
        requests_per_minute: 20,
    },
    BuiltinProvider {
        name: "Together",
        base_url: "https://api.together.ai/v1",
        env_var: "TOGETHER_API_KEY",
        model: "meta-llama/Llama-3.3-70B-Instruct-Turbo",
        daily_request_limit: 500,
        token_limit_per_minute: 50000,
        requests_per_minute: 10,
    },
    BuiltinProvider {
        name: "Mistral",
        base_url: "https://api.mistral.ai/v1",
        env_var: "MISTRAL_API_KEY",
        model: "mistral-7b-instruct",
        daily_request_limit: 200,
        token_limit_per_minute: 20000,
        requests_per_minute: 20,
    },
    BuiltinProvider {
        name: "HuggingFace",
        base_url: "https://api-inference.huggingface.co/models",
        env_var: "HUGGINGFACE_API_KEY",
        model: "meta-llama/Llama-3.3-70B-Instruct",
        daily_request_limit: 1000,
        token_limit_per_minute: 10000,
        requests_per_minute: 10,
    },
    BuiltinProvider {
        name: "Fireworks",
        base_url: "https://api.fireworks.ai/inference/v1",
        env_var: "FIREWORKS_API_KEY",
        model: "accounts/fireworks/models/llama-v3p3-70b-instruct",
        daily_request_limit: 500,
        token_limit_per_minute: 10000,
        requests_per_minute: 5,
    },
];

/// Ordered set of provider descriptors.
///
/// # Example
///
/// ```
/// use cascade_rate_limit::ProviderRegistry;
///
/// let registry = ProviderRegistry::from_lookup(|var| {
///     (var == "CEREBRAS_API_KEY").then(|| "csk-test".to_string())
/// });
/// assert_eq!(registry.list_all().len(), 7);
///
/// let available: Vec<_> = registry.list_available().iter().map(|p| p.name().clone()).collect();
/// assert_eq!(available, vec!["Cerebras".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Built-in providers with credentials read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Built-in providers with credentials resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let providers = BUILTIN
            .iter()
            .map(|builtin| {
                let api_key = lookup(builtin.env_var).unwrap_or_default();
                ProviderDescriptor::new(
                    builtin.name,
                    builtin.base_url,
                    api_key,
                    builtin.model,
                    builtin.daily_request_limit,
                    builtin.token_limit_per_minute,
                )
                .with_requests_per_minute(builtin.requests_per_minute)
            })
            .collect::<Vec<_>>();

        debug!(
            available = providers.iter().filter(|p| p.is_available()).count(),
            total = providers.len(),
            "Built provider registry"
        );

        Self { providers }
    }

    /// Registry over an explicit, already ordered list.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Self {
        Self { providers }
    }

    /// Every provider in priority order, credentialed or not.
    pub fn list_all(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Providers with a usable credential, in priority order.
    pub fn list_available(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .cloned()
            .collect()
    }

    /// Provider with exactly this name.
    pub fn find(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Providers whose names appear in `names`, in registry order.
    ///
    /// Unknown names are ignored.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .filter(|p| names.iter().any(|n| n.as_ref() == p.name()))
            .cloned()
            .collect()
    }

    /// Name of the environment variable holding a built-in provider's credential.
    pub fn credential_var(name: &str) -> Option<&'static str> {
        BUILTIN.iter().find(|b| b.name == name).map(|b| b.env_var)
    }
}
