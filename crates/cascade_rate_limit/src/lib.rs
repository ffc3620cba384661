//! Usage accounting, provider registry and pacing for Cascade.
//!
//! This crate holds everything a cascade consults before it sends a request:
//!
//! - [`CascadeConfig`] - layered runtime settings
//! - [`ProviderRegistry`] - the ordered built-in providers and their caps
//! - [`UsageStore`] - persisted daily counters that gate each provider
//! - [`BackoffPolicy`] - the delay schedule between retries of one provider
//! - [`RequestPacer`] - in-process per-minute request limiting
//!
//! ```
//! use cascade_rate_limit::{CascadeConfig, ProviderRegistry, UsageStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = CascadeConfig::default();
//! let registry = ProviderRegistry::from_lookup(|var| {
//!     (var == "GROQ_API_KEY").then(|| "gsk-test".to_string())
//! });
//! let store = UsageStore::in_memory();
//!
//! for provider in registry.list_available() {
//!     assert!(store.check_limit(&provider).await);
//! }
//! assert_eq!(config.backoff_policy().delay(1).as_secs(), 2);
//! # }
//! ```

mod backoff;
mod config;
mod pacer;
mod providers;
mod usage;

pub use backoff::{BackoffPolicy, BackoffSchedule};
pub use config::{CascadeConfig, ENV_OVERRIDES};
pub use pacer::RequestPacer;
pub use providers::{ProviderDescriptor, ProviderRegistry};
pub use usage::{Clock, ProviderUsage, UsageRecord, UsageReport, UsageStore};
