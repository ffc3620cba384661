//! Deterministic exponential backoff between retries of one provider.

use std::time::Duration;

/// Delay schedule `min(base^attempt, max_delay)` seconds, with no jitter.
///
/// `attempt` is 0 for the wait before the first retry.
///
/// # Example
///
/// ```
/// use cascade_rate_limit::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::new(2, 60);
/// assert_eq!(policy.delay(0), Duration::from_secs(1));
/// assert_eq!(policy.delay(3), Duration::from_secs(8));
/// assert_eq!(policy.delay(10), Duration::from_secs(60));
///
/// let waits: Vec<_> = policy.schedule().take(3).collect();
/// assert_eq!(waits, vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackoffPolicy {
    base_secs: u64,
    max_delay_secs: u64,
}

impl BackoffPolicy {
    /// Create a policy from a base and a cap, both in seconds.
    pub fn new(base_secs: u64, max_delay_secs: u64) -> Self {
        Self {
            base_secs,
            max_delay_secs,
        }
    }

    /// Wait before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = self
            .base_secs
            .checked_pow(attempt)
            .unwrap_or(u64::MAX)
            .min(self.max_delay_secs);
        Duration::from_secs(secs)
    }

    /// Infinite iterator over the delays for attempts 0, 1, 2, ...
    ///
    /// Bound it with `take(max_retries)` to get the waits of one provider.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            policy: *self,
            attempt: 0,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(2, 60)
    }
}

/// Iterator produced by [`BackoffPolicy::schedule`].
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.policy.delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}
