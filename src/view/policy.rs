//! Synchronization policy knobs
//!
//! Defaults reproduce plain fire-and-forget behavior: one fetch attempt, no
//! rollback. Retry and rollback are explicit opt-ins.

use std::time::Duration;

/// Retry schedule for idempotent remote calls (fetch)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. 1 disables retry.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Backoff schedule for re-opening a dropped real-time subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl ReconnectPolicy {
    /// Next delay after `current`: doubled, capped at `max_backoff`
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// How the view-model reconciles optimistic state with remote outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Undo the optimistic mutation when the remote create/delete/update fails
    pub rollback: bool,
    pub fetch_retry: RetryPolicy,
    pub reconnect: ReconnectPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fire_and_forget() {
        let policy = SyncPolicy::default();
        assert!(!policy.rollback);
        assert_eq!(policy.fetch_retry.max_attempts, 1);
    }

    #[test]
    fn test_reconnect_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            initial_backoff: Duration::from_millis(400),
            max_backoff: Duration::from_secs(1),
        };
        let second = policy.next_delay(policy.initial_backoff);
        assert_eq!(second, Duration::from_millis(800));
        assert_eq!(policy.next_delay(second), Duration::from_secs(1));
        assert_eq!(policy.next_delay(Duration::from_secs(1)), Duration::from_secs(1));
    }
}
