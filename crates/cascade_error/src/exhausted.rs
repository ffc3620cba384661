//! Terminal cascade failure.

/// Why a single provider was given up on during a cascade.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FailureReason {
    /// The provider was already at its daily request or token cap; no request was sent
    #[display("daily usage limit reached")]
    LimitReached,
    /// Every allowed attempt failed with a retryable error
    #[display("failed after {} attempts: {}", attempts, last_error)]
    RetriesExhausted {
        /// Attempts made against this provider
        attempts: u32,
        /// Error from the final attempt
        last_error: String,
    },
    /// A non-retryable error ended attempts against this provider
    #[display("fatal error: {}", error)]
    Fatal {
        /// The error that stopped the provider
        error: String,
    },
}

/// One provider's entry in an exhausted cascade.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}: {}", provider, reason)]
pub struct ProviderFailure {
    /// Provider name
    pub provider: String,
    /// Why it failed
    pub reason: FailureReason,
}

impl ProviderFailure {
    /// Create a failure entry for a provider.
    pub fn new(provider: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            provider: provider.into(),
            reason,
        }
    }
}

/// Every provider in the cascade failed.
///
/// # Examples
///
/// ```
/// use cascade_error::{ExhaustedError, FailureReason, ProviderFailure};
///
/// let err = ExhaustedError::new(vec![
///     ProviderFailure::new("Groq", FailureReason::LimitReached),
///     ProviderFailure::new("Cerebras", FailureReason::Fatal { error: "HTTP 401".into() }),
/// ]);
/// assert_eq!(err.provider_count(), 2);
/// assert!(format!("{}", err).starts_with("All 2 API providers failed"));
/// ```
#[derive(Debug, Clone, derive_more::Error)]
pub struct ExhaustedError {
    failures: Vec<ProviderFailure>,
    line: u32,
    file: &'static str,
}

impl ExhaustedError {
    /// Create a new exhausted error with caller location tracking.
    #[track_caller]
    pub fn new(failures: Vec<ProviderFailure>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            failures,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Number of providers the cascade attempted.
    pub fn provider_count(&self) -> usize {
        self.failures.len()
    }

    /// Per-provider failures in the order the providers were tried.
    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }
}

impl std::fmt::Display for ExhaustedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "All {} API providers failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        write!(f, " at line {} in {}", self.line, self.file)
    }
}
