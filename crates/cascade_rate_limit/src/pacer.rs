//! Per-minute request pacing using governor.
//!
//! Each provider gets a GCRA limiter built from its requests-per-minute cap. The
//! orchestrator waits on it before every HTTP attempt, so bursts of retries and
//! back-to-back cascades stay under the provider's per-minute request budget.
//! Pacing state lives in memory only; daily caps are enforced by the usage store.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-minute limiter for one provider.
///
/// Cloning shares the underlying limiter.
///
/// # Example
///
/// ```
/// use cascade_rate_limit::RequestPacer;
///
/// let pacer = RequestPacer::new(2);
/// assert!(pacer.try_acquire());
/// assert!(pacer.try_acquire());
/// assert!(!pacer.try_acquire());
///
/// let unlimited = RequestPacer::new(0);
/// assert!(unlimited.is_unlimited());
/// ```
#[derive(Debug, Clone)]
pub struct RequestPacer {
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl RequestPacer {
    /// Create a pacer allowing `requests_per_minute` requests, all available as a burst.
    ///
    /// A cap of zero disables pacing.
    pub fn new(requests_per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_minute)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));
        Self { limiter }
    }

    /// Pacer that never waits.
    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// Whether this pacer never waits.
    pub fn is_unlimited(&self) -> bool {
        self.limiter.is_none()
    }

    /// Wait until one more request fits in the per-minute budget, then consume it.
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!("Per-minute request budget spent, waiting for pacer");
                limiter.until_ready().await;
            }
        }
    }

    /// Consume one request slot without waiting; false if none is free.
    pub fn try_acquire(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }
}
