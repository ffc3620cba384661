//! Per-attempt provider errors and their failure classification.

/// How the orchestrator treats a failed provider attempt.
///
/// The class, not the concrete error, decides whether the same provider is retried.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FailureClass {
    /// The provider throttled the request (HTTP 429). Retryable.
    RateLimited,
    /// Transient provider-side trouble: 5xx, 408, network faults, empty completions. Retryable.
    ProviderError,
    /// Anything else: auth, malformed request, unparseable response. Falls through at once.
    Unexpected,
}

impl FailureClass {
    /// Whether an attempt that failed with this class may be retried on the same provider.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureClass::RateLimited | FailureClass::ProviderError)
    }
}

/// Provider attempt error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// HTTP 429 from the provider
    #[display("Rate limit hit: {}", _0)]
    RateLimited(String),
    /// Credential rejected (HTTP 401/403)
    #[display("Authentication failed (HTTP {}): {}", status, message)]
    Auth {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Non-success HTTP status other than 429 and auth failures
    #[display("HTTP {} error: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// The request never produced an HTTP response (DNS, connect, reset)
    #[display("Network error: {}", _0)]
    Network(String),
    /// The request timed out before a response arrived
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// The response body could not be decoded
    #[display("Failed to parse response: {}", _0)]
    ResponseParsing(String),
    /// The provider answered without any completion text
    #[display("Provider returned an empty completion ({} tokens charged)", total_tokens)]
    EmptyCompletion {
        /// Tokens the provider still reported for the call
        total_tokens: u64,
    },
    /// Anything the client could not categorize
    #[display("Unexpected error: {}", _0)]
    Unexpected(String),
}

impl ProviderErrorKind {
    /// Classify this error for retry decisions.
    pub fn class(&self) -> FailureClass {
        match self {
            ProviderErrorKind::RateLimited(_) => FailureClass::RateLimited,
            ProviderErrorKind::Api { status, .. } => match *status {
                429 => FailureClass::RateLimited,
                408 | 500..=599 => FailureClass::ProviderError,
                _ => FailureClass::Unexpected,
            },
            ProviderErrorKind::Network(_)
            | ProviderErrorKind::Timeout(_)
            | ProviderErrorKind::EmptyCompletion { .. } => FailureClass::ProviderError,
            ProviderErrorKind::Auth { .. }
            | ProviderErrorKind::ResponseParsing(_)
            | ProviderErrorKind::Unexpected(_) => FailureClass::Unexpected,
        }
    }

    /// Tokens the provider charged for a failed call.
    pub fn tokens_charged(&self) -> u64 {
        match self {
            ProviderErrorKind::EmptyCompletion { total_tokens } => *total_tokens,
            _ => 0,
        }
    }

    /// Whether the provider received the request and answered.
    ///
    /// Attempts that reached the provider count against its usage, successful or not.
    pub fn reached_provider(&self) -> bool {
        !matches!(
            self,
            ProviderErrorKind::Network(_)
                | ProviderErrorKind::Timeout(_)
                | ProviderErrorKind::Unexpected(_)
        )
    }

    /// Build the kind for a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => ProviderErrorKind::RateLimited(message),
            401 | 403 => ProviderErrorKind::Auth { status, message },
            _ => ProviderErrorKind::Api { status, message },
        }
    }
}

/// A failed attempt against one provider, with source location tracking.
///
/// # Examples
///
/// ```
/// use cascade_error::{FailureClass, ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new("Groq", ProviderErrorKind::from_status(503, "overloaded"));
/// assert!(err.is_retryable());
/// assert_eq!(err.class(), FailureClass::ProviderError);
///
/// let err = ProviderError::new("Groq", ProviderErrorKind::from_status(401, "bad key"));
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error [{}]: {} at line {} in {}", provider, kind, line, file)]
pub struct ProviderError {
    /// Name of the provider the attempt targeted
    pub provider: String,
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider: provider.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Failure class of the underlying kind.
    pub fn class(&self) -> FailureClass {
        self.kind.class()
    }
}

/// Trait for errors that support retry logic.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }
}
