//! Usage storage error types.

/// Kinds of usage storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the directory holding the usage file
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write the usage file
    #[display("Failed to write usage file: {}", _0)]
    FileWrite(String),
    /// Failed to read the usage file
    #[display("Failed to read usage file: {}", _0)]
    FileRead(String),
    /// Usage file contents could not be parsed
    #[display("Corrupt usage file: {}", _0)]
    Corrupt(String),
    /// Usage records could not be serialized
    #[display("Failed to serialize usage records: {}", _0)]
    Serialization(String),
}

/// Storage error with location tracking.
///
/// Usage storage failures never abort a request; the usage store logs them and keeps
/// counting in memory.
///
/// # Examples
///
/// ```
/// use cascade_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileWrite("usage_tracking.json".to_string()));
/// assert!(format!("{}", err).contains("usage_tracking.json"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
