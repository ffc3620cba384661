//! Runtime configuration for cascades.
//!
//! This module provides layered configuration built with the `config` crate:
//! - Bundled defaults (include_str! from cascade.toml)
//! - User overrides (~/.config/cascade/cascade.toml, then ./cascade.toml)
//! - Recognized environment variables, each overriding one key
//!
//! The resulting [`CascadeConfig`] is constructed once and handed to the orchestrator,
//! usage store and backoff policy; nothing reads settings from global state.

use crate::BackoffPolicy;
use cascade_error::{CascadeResult, ConfigError};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../cascade.toml");

/// Environment variables recognized as overrides, paired with the key they set.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("LOG_LEVEL", "log_level"),
    ("LOG_FILE", "log_file"),
    ("USAGE_TRACKING_FILE", "usage_tracking_file"),
    ("DEFAULT_MAX_TOKENS", "default_max_tokens"),
    ("DEFAULT_TEMPERATURE", "default_temperature"),
    ("DEFAULT_MAX_RETRIES", "default_max_retries"),
    ("MAX_BACKOFF_DELAY", "max_backoff_delay"),
    ("BASE_BACKOFF_DELAY", "base_backoff_delay"),
    ("REQUEST_TIMEOUT", "request_timeout"),
];

/// Settings shared by every component of a cascade.
///
/// # Example
///
/// ```no_run
/// use cascade_rate_limit::CascadeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CascadeConfig::load()?;
/// println!("retries per provider: {}", config.default_max_retries());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct CascadeConfig {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "debug")
    #[setters(into)]
    log_level: String,

    /// File receiving a plain-text copy of the log; empty disables it
    #[getter(skip)]
    #[setters(into)]
    log_file: String,

    /// JSON file holding per-provider usage counters
    #[setters(into)]
    usage_tracking_file: PathBuf,

    /// `max_tokens` sent when a request does not set one
    default_max_tokens: u32,

    /// `temperature` sent when a request does not set one
    default_temperature: f32,

    /// Retries per provider when a request does not override it
    default_max_retries: u32,

    /// Upper bound on a single backoff wait, in seconds
    max_backoff_delay: u64,

    /// Base of the exponential backoff, in seconds
    base_backoff_delay: u64,

    /// Per-request HTTP timeout, in seconds
    request_timeout: u64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "cascade_api.log".to_string(),
            usage_tracking_file: PathBuf::from("usage_tracking.json"),
            default_max_tokens: 500,
            default_temperature: 0.7,
            default_max_retries: 2,
            max_backoff_delay: 60,
            base_backoff_delay: 2,
            request_timeout: 60,
        }
    }
}

impl CascadeConfig {
    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file or environment value cannot be parsed, or if the
    /// result fails [`CascadeConfig::validate`].
    #[instrument]
    pub fn load() -> CascadeResult<Self> {
        Self::load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`CascadeConfig::load`], reading overrides through `lookup` instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// See [`CascadeConfig::load`].
    pub fn load_with_env<F>(lookup: F) -> CascadeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder = Self::defaults_builder();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cascade/cascade.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("cascade").required(false));

        Self::finish(Self::apply_env(builder, lookup)?)
    }

    /// Load configuration from a specific file layered over the bundled defaults.
    ///
    /// Environment variables are not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CascadeResult<Self> {
        debug!("Loading configuration from file");

        let builder = Self::defaults_builder().add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    /// Load a specific file over the bundled defaults, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment value cannot be parsed.
    pub fn from_file_with_env<F>(path: impl AsRef<Path>, lookup: F) -> CascadeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let builder = Self::defaults_builder().add_source(File::from(path.as_ref()));
        Self::finish(Self::apply_env(builder, lookup)?)
    }

    fn defaults_builder() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn apply_env<F>(
        mut builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> CascadeResult<ConfigBuilder<DefaultState>>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            let value = lookup(var);
            if value.is_some() {
                debug!(var, key, "Applying environment override");
            }
            builder = builder.set_override_option(*key, value).map_err(|e| {
                ConfigError::new(format!("Invalid value for {}: {}", var, e))
            })?;
        }
        Ok(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> CascadeResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make a cascade misbehave.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero backoff base, a zero request timeout, or a default
    /// temperature outside `[0, 2]`.
    pub fn validate(&self) -> CascadeResult<()> {
        if self.base_backoff_delay == 0 {
            return Err(ConfigError::new("BASE_BACKOFF_DELAY must be at least 1 second").into());
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::new("REQUEST_TIMEOUT must be at least 1 second").into());
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::new(format!(
                "DEFAULT_TEMPERATURE must be in [0, 2], got {}",
                self.default_temperature
            ))
            .into());
        }
        Ok(())
    }

    /// Log file path, or `None` when file logging is disabled.
    pub fn log_file(&self) -> Option<&Path> {
        let trimmed = self.log_file.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Path::new(trimmed))
        }
    }

    /// Backoff policy described by this configuration.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.base_backoff_delay, self.max_backoff_delay)
    }

    /// HTTP timeout as a duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
