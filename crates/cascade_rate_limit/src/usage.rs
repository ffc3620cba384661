//! Persisted per-provider usage counters with a daily reset.
//!
//! The store is the single source of truth for daily limit checks. Every mutation
//! rewrites the whole JSON document while the store's mutex is held, so concurrent
//! cascades in one process never lose an update. Storage faults are logged and the
//! store carries on in memory.

use crate::{CascadeConfig, ProviderDescriptor};
use cascade_error::{StorageError, StorageErrorKind};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Source of "today" for the daily reset.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Today's counters for one provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct UsageRecord {
    /// Day the counters belong to
    date: NaiveDate,
    /// Requests issued on that day
    requests: u64,
    /// Tokens consumed on that day
    tokens: u64,
}

impl UsageRecord {
    /// Zeroed record for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            requests: 0,
            tokens: 0,
        }
    }

    /// This record if it belongs to `today`, otherwise a zeroed one.
    fn current(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self::new(today)
        }
    }
}

/// Persisted usage counters keyed by provider name.
///
/// Cloning shares the same counters and file.
///
/// # Example
///
/// ```
/// use cascade_rate_limit::{ProviderDescriptor, UsageStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = UsageStore::in_memory();
/// let groq = ProviderDescriptor::new("Groq", "https://api.groq.com/openai/v1", "key", "llama", 2, 6000);
///
/// store.update("Groq", 2, 150).await;
/// assert_eq!(*store.get("Groq").await.requests(), 2);
/// assert!(!store.check_limit(&groq).await);
/// # }
/// ```
#[derive(Clone)]
pub struct UsageStore {
    records: Arc<Mutex<BTreeMap<String, UsageRecord>>>,
    path: Option<PathBuf>,
    today: Clock,
}

impl fmt::Debug for UsageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl UsageStore {
    /// Open the store backed by `path`, loading any existing counters.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged and the
    /// store starts empty; the next update overwrites it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match load_records(&path).await {
            Ok(records) => {
                debug!(providers = records.len(), "Loaded usage records");
                records
            }
            Err(e) => {
                warn!(error = %e, "Could not load usage records, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            records: Arc::new(Mutex::new(records)),
            path: Some(path),
            today: default_clock(),
        }
    }

    /// Open the store at the configured usage tracking file.
    pub async fn from_config(config: &CascadeConfig) -> Self {
        Self::open(config.usage_tracking_file()).await
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            path: None,
            today: default_clock(),
        }
    }

    /// Replace the source of "today".
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    /// File the store persists to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Today's record for `provider`, zeroed when absent or from an earlier day.
    pub async fn get(&self, provider: &str) -> UsageRecord {
        let today = (self.today)();
        let records = self.records.lock().await;
        records
            .get(provider)
            .map(|r| r.current(today))
            .unwrap_or_else(|| UsageRecord::new(today))
    }

    /// Add to today's counters for `provider` and persist the store.
    ///
    /// Returns the updated record. Persistence failures are logged, never returned.
    #[instrument(skip(self))]
    pub async fn update(&self, provider: &str, requests: u64, tokens: u64) -> UsageRecord {
        let today = (self.today)();
        let mut records = self.records.lock().await;

        let record = records
            .get(provider)
            .map(|r| r.current(today))
            .unwrap_or_else(|| UsageRecord::new(today));
        let updated = UsageRecord {
            date: today,
            requests: record.requests.saturating_add(requests),
            tokens: record.tokens.saturating_add(tokens),
        };
        records.insert(provider.to_string(), updated);

        debug!(
            requests = updated.requests,
            tokens = updated.tokens,
            "Updated usage"
        );

        if let Some(path) = &self.path {
            if let Err(e) = persist_records(path, &records).await {
                warn!(error = %e, "Failed to persist usage records, continuing in memory");
            }
        }

        updated
    }

    /// Whether `provider` is still under both of its daily caps.
    ///
    /// The daily token budget is the per-minute token cap times 1440.
    #[instrument(skip(self, provider), fields(provider = %provider.name()))]
    pub async fn check_limit(&self, provider: &ProviderDescriptor) -> bool {
        let usage = self.get(provider.name()).await;

        if usage.requests >= *provider.daily_request_limit() {
            warn!(
                requests = usage.requests,
                limit = provider.daily_request_limit(),
                "Daily request limit reached"
            );
            return false;
        }

        let budget = provider.daily_token_budget();
        if usage.tokens >= budget {
            warn!(tokens = usage.tokens, budget, "Daily token budget reached");
            return false;
        }

        true
    }

    /// Usage summary for `providers`, in the order given.
    pub async fn usage_stats(&self, providers: &[ProviderDescriptor]) -> UsageReport {
        let mut entries = Vec::with_capacity(providers.len());
        for provider in providers {
            let usage = self.get(provider.name()).await;
            entries.push(ProviderUsage::new(provider, &usage));
        }
        UsageReport { providers: entries }
    }
}

fn default_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

async fn load_records(path: &Path) -> Result<BTreeMap<String, UsageRecord>, StorageError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            ))));
        }
    };

    serde_json::from_str(&contents).map_err(|e| {
        StorageError::new(StorageErrorKind::Corrupt(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

async fn persist_records(
    path: &Path,
    records: &BTreeMap<String, UsageRecord>,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, json).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            tmp_path.display(),
            e
        )))
    })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

/// One provider's line in a [`UsageReport`].
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct ProviderUsage {
    /// Provider name
    provider: String,
    /// Requests issued today
    requests_used: u64,
    /// Daily request cap
    requests_limit: u64,
    /// Requests left today, never negative
    requests_remaining: u64,
    /// Share of the daily request cap used, in percent, rounded to two decimals
    utilization_percent: f64,
    /// Tokens consumed today
    tokens_used: u64,
}

impl ProviderUsage {
    fn new(provider: &ProviderDescriptor, usage: &UsageRecord) -> Self {
        let limit = *provider.daily_request_limit();
        let utilization_percent = if limit == 0 {
            100.0
        } else {
            let raw = usage.requests as f64 / limit as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            provider: provider.name().clone(),
            requests_used: usage.requests,
            requests_limit: limit,
            requests_remaining: limit.saturating_sub(usage.requests),
            utilization_percent,
            tokens_used: usage.tokens,
        }
    }
}

impl fmt::Display for ProviderUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} requests ({}%), {} tokens",
            self.provider,
            self.requests_used,
            self.requests_limit,
            self.utilization_percent,
            self.tokens_used
        )
    }
}

/// Usage summary across providers.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct UsageReport {
    /// Per-provider usage in priority order
    providers: Vec<ProviderUsage>,
}

impl UsageReport {
    /// Entry for `provider`, if it was part of the report.
    pub fn get(&self, provider: &str) -> Option<&ProviderUsage> {
        self.providers.iter().find(|p| p.provider == provider)
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Usage Statistics:")?;
        for usage in &self.providers {
            write!(f, "\n  {}", usage)?;
        }
        Ok(())
    }
}
