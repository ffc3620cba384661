//! Error types for the Cascade library.
//!
//! This crate provides the foundation error types used throughout the Cascade workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Per-attempt provider failures ([`ProviderError`]) carry a [`FailureClass`] that the
//! orchestrator uses to choose between retrying and falling through. Only
//! [`CascadeErrorKind::Exhausted`] and configuration problems reach callers of a cascade.
//!
//! # Examples
//!
//! ```
//! use cascade_error::{CascadeResult, ConfigError};
//!
//! fn load() -> CascadeResult<String> {
//!     Err(ConfigError::new("No API providers available"))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod exhausted;
mod provider;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{CascadeError, CascadeErrorKind, CascadeResult};
pub use exhausted::{ExhaustedError, FailureReason, ProviderFailure};
pub use provider::{FailureClass, ProviderError, ProviderErrorKind, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
