//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, ExhaustedError, ProviderError, StorageError};

/// Every error condition a Cascade operation can surface.
///
/// # Examples
///
/// ```
/// use cascade_error::{CascadeError, ConfigError};
///
/// let config_err = ConfigError::new("No API providers available");
/// let err: CascadeError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CascadeErrorKind {
    /// Configuration error, including an empty provider list
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder or request validation error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Usage storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// A single provider attempt failed
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Every provider in the cascade failed
    #[from(ExhaustedError)]
    Exhausted(ExhaustedError),
    /// The caller cancelled the cascade
    #[display("Cascade cancelled by caller")]
    #[from(ignore)]
    Cancelled,
}

/// Cascade error with kind discrimination.
///
/// # Examples
///
/// ```
/// use cascade_error::{CascadeError, CascadeErrorKind, CascadeResult, ConfigError};
///
/// fn might_fail() -> CascadeResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), CascadeErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cascade Error: {}", _0)]
pub struct CascadeError(Box<CascadeErrorKind>);

impl CascadeError {
    /// Create a new error from a kind.
    pub fn new(kind: CascadeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Error returned when a caller cancels an in-flight cascade.
    pub fn cancelled() -> Self {
        Self::new(CascadeErrorKind::Cancelled)
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CascadeErrorKind {
        &self.0
    }

    /// Consume the error and return its kind.
    pub fn into_kind(self) -> CascadeErrorKind {
        *self.0
    }
}

// Generic From implementation for any type that converts to CascadeErrorKind
impl<T> From<T> for CascadeError
where
    T: Into<CascadeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Cascade operations.
pub type CascadeResult<T> = std::result::Result<T, CascadeError>;
