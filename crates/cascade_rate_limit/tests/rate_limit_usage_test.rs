//! Tests for persisted usage counters.

use cascade_rate_limit::{ProviderDescriptor, UsageStore};
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

fn provider(name: &str, daily_limit: u64, tokens_per_minute: u64) -> ProviderDescriptor {
    ProviderDescriptor::new(
        name,
        "http://localhost/v1",
        "key",
        "model",
        daily_limit,
        tokens_per_minute,
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

/// Clock whose day can be advanced from the test.
fn movable_clock() -> (Arc<AtomicU32>, impl Fn() -> NaiveDate + Send + Sync + 'static) {
    let current = Arc::new(AtomicU32::new(10));
    let handle = Arc::clone(&current);
    (handle, move || day(current.load(Ordering::SeqCst)))
}

#[tokio::test]
async fn test_unknown_provider_reads_zero() {
    let store = UsageStore::in_memory().with_clock(|| day(1));
    let record = store.get("Groq").await;

    assert_eq!(*record.date(), day(1));
    assert_eq!(*record.requests(), 0);
    assert_eq!(*record.tokens(), 0);
}

#[tokio::test]
async fn test_updates_accumulate() {
    let store = UsageStore::in_memory();

    store.update("Groq", 1, 120).await;
    let record = store.update("Groq", 1, 80).await;

    assert_eq!(*record.requests(), 2);
    assert_eq!(*record.tokens(), 200);
    assert_eq!(store.get("Groq").await, record);
}

#[tokio::test]
async fn test_check_limit_at_request_cap() {
    let store = UsageStore::in_memory();
    let groq = provider("Groq", 3, 6000);

    store.update("Groq", 2, 0).await;
    assert!(store.check_limit(&groq).await, "just below the cap");

    store.update("Groq", 1, 0).await;
    assert!(!store.check_limit(&groq).await, "at the cap");
}

#[tokio::test]
async fn test_check_limit_at_token_budget() {
    let store = UsageStore::in_memory();
    let tiny = provider("Tiny", 1000, 1);

    store.update("Tiny", 1, 1439).await;
    assert!(store.check_limit(&tiny).await);

    store.update("Tiny", 0, 1).await;
    assert!(!store.check_limit(&tiny).await);
}

#[tokio::test]
async fn test_zero_daily_limit_is_always_exhausted() {
    let store = UsageStore::in_memory();
    assert!(!store.check_limit(&provider("Closed", 0, 6000)).await);
}

#[tokio::test]
async fn test_counters_reset_on_new_day() {
    let (today, clock) = movable_clock();
    let store = UsageStore::in_memory().with_clock(clock);
    let groq = provider("Groq", 2, 6000);

    store.update("Groq", 2, 500).await;
    assert!(!store.check_limit(&groq).await);

    today.store(11, Ordering::SeqCst);

    assert!(store.check_limit(&groq).await);
    let record = store.get("Groq").await;
    assert_eq!(*record.date(), day(11));
    assert_eq!(*record.requests(), 0);

    let record = store.update("Groq", 1, 10).await;
    assert_eq!(*record.requests(), 1);
    assert_eq!(*record.tokens(), 10);
}

#[tokio::test]
async fn test_persists_and_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.json");

    let store = UsageStore::open(&path).await.with_clock(|| day(5));
    store.update("Cerebras", 1, 42).await;
    store.update("Groq", 3, 7).await;

    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["Cerebras"]["date"], "2025-03-05");
    assert_eq!(json["Cerebras"]["requests"], 1);
    assert_eq!(json["Groq"]["tokens"], 7);
    assert!(!dir.path().join("usage.json.tmp").exists());

    let reopened = UsageStore::open(&path).await.with_clock(|| day(5));
    assert_eq!(*reopened.get("Groq").await.requests(), 3);
    assert_eq!(*reopened.get("Cerebras").await.tokens(), 42);
}

#[tokio::test]
async fn test_creates_missing_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("usage.json");

    let store = UsageStore::open(&path).await;
    store.update("Groq", 1, 1).await;

    assert!(path.exists());
}

#[tokio::test]
async fn test_stale_file_records_read_as_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.json");
    std::fs::write(
        &path,
        r#"{"Groq": {"date": "2025-03-01", "requests": 999, "tokens": 5}}"#,
    )
    .unwrap();

    let store = UsageStore::open(&path).await.with_clock(|| day(2));

    assert_eq!(*store.get("Groq").await.requests(), 0);
    assert!(store.check_limit(&provider("Groq", 1000, 6000)).await);
}

#[tokio::test]
async fn test_corrupt_file_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = UsageStore::open(&path).await;
    assert_eq!(*store.get("Groq").await.requests(), 0);

    store.update("Groq", 1, 5).await;
    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["Groq"]["requests"], 1);
}

#[tokio::test]
async fn test_unwritable_path_keeps_counting_in_memory() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every write fail
    let path = dir.path().join("blocked");
    std::fs::create_dir(&path).unwrap();

    let store = UsageStore::open(&path).await;
    store.update("Groq", 1, 5).await;
    let record = store.update("Groq", 1, 5).await;

    assert_eq!(*record.requests(), 2);
    assert_eq!(*record.tokens(), 10);
}

#[tokio::test]
async fn test_concurrent_updates_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.json");
    let store = UsageStore::open(&path).await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.update("Groq", 1, 10).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = store.get("Groq").await;
    assert_eq!(*record.requests(), 50);
    assert_eq!(*record.tokens(), 500);

    let reopened = UsageStore::open(&path).await;
    assert_eq!(*reopened.get("Groq").await.requests(), 50);
}

#[tokio::test]
async fn test_usage_stats_report() {
    let store = UsageStore::in_memory();
    let providers = vec![provider("Groq", 1000, 6000), provider("Mistral", 3, 20000)];

    store.update("Groq", 3, 300).await;
    store.update("Mistral", 4, 0).await;

    let report = store.usage_stats(&providers).await;
    assert_eq!(report.providers().len(), 2);

    let groq = report.get("Groq").unwrap();
    assert_eq!(*groq.requests_used(), 3);
    assert_eq!(*groq.requests_remaining(), 997);
    assert_eq!(*groq.utilization_percent(), 0.3);
    assert_eq!(*groq.tokens_used(), 300);

    let mistral = report.get("Mistral").unwrap();
    assert_eq!(*mistral.requests_remaining(), 0);
    assert_eq!(*mistral.utilization_percent(), 133.33);

    let rendered = format!("{}", report);
    assert!(rendered.starts_with("Usage Statistics:"));
    assert!(rendered.contains("Groq: 3/1000 requests (0.3%)"));
}

#[tokio::test]
async fn test_usage_stats_zero_limit_reports_full() {
    let store = UsageStore::in_memory();
    let report = store.usage_stats(&[provider("Closed", 0, 1)]).await;

    assert_eq!(*report.get("Closed").unwrap().utilization_percent(), 100.0);
}
