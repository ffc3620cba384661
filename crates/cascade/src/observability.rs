//! Logging setup for the `cascade` binary and embedding applications.
//!
//! Logs go to stderr and, when a log file is configured, a plain-text copy is appended
//! to that file. `RUST_LOG` takes precedence over the configured level.

use cascade_error::{CascadeResult, ConfigError};
use cascade_rate_limit::CascadeConfig;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "debug")
    pub log_level: String,
    /// File receiving a plain-text copy of the log
    pub log_file: Option<PathBuf>,
    /// Emit JSON lines on stderr instead of human-readable text
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Logging as described by a cascade configuration.
    pub fn from_config(config: &CascadeConfig) -> Self {
        Self {
            log_level: config.log_level().clone(),
            log_file: config.log_file().map(Path::to_path_buf),
            json_logs: false,
        }
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set or clear the log file.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::from_config(&CascadeConfig::default())
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns a configuration error if the level is not a valid filter, the log file
/// cannot be opened, or a subscriber is already installed.
pub fn init_observability(config: &ObservabilityConfig) -> CascadeResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ConfigError::new(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let stderr_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    ConfigError::new(format!("Failed to open log file {}: {}", path.display(), e))
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
