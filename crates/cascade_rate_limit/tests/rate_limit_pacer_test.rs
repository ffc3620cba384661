//! Tests for per-minute request pacing.

use cascade_rate_limit::RequestPacer;
use std::time::Duration;

#[test]
fn test_burst_up_to_quota() {
    let pacer = RequestPacer::new(3);

    assert!(pacer.try_acquire());
    assert!(pacer.try_acquire());
    assert!(pacer.try_acquire());
    assert!(!pacer.try_acquire());
}

#[test]
fn test_clones_share_quota() {
    let pacer = RequestPacer::new(1);
    let clone = pacer.clone();

    assert!(pacer.try_acquire());
    assert!(!clone.try_acquire());
}

#[test]
fn test_zero_quota_is_unlimited() {
    let pacer = RequestPacer::new(0);

    assert!(pacer.is_unlimited());
    for _ in 0..1000 {
        assert!(pacer.try_acquire());
    }
}

#[tokio::test]
async fn test_until_ready_returns_immediately_with_budget() {
    let pacer = RequestPacer::new(60);

    tokio::time::timeout(Duration::from_secs(1), pacer.until_ready())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), RequestPacer::unlimited().until_ready())
        .await
        .unwrap();
}
