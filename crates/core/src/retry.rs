//! Injectable retry policy for external provider calls.
//!
//! The policy is passed in by the caller rather than read from a module
//! constant, so tests can inject a zero-delay variant.

use std::time::Duration;

use rand::Rng;

/// Default number of attempts against an external provider.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Exponential backoff policy: the delay doubles on every attempt,
/// with optional random jitter of up to half the computed delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each subsequent retry.
    pub base_delay: Duration,
    /// Add up to 50% random jitter to each delay.
    pub jitter: bool,
}

impl RetryPolicy {
    /// Production policy: 3 attempts, 500 ms base delay, jitter on.
    pub fn standard() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            jitter: true,
        }
    }

    /// Test policy: same attempt count, but no waiting between attempts.
    pub fn zero_delay() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay to wait after a failed attempt (`attempt` is zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        if self.jitter && !base.is_zero() {
            let jitter_ms = rand::rng().random_range(0..=base.as_millis() as u64 / 2);
            base + Duration::from_millis(jitter_ms)
        } else {
            base
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt_without_jitter() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            jitter: false,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn zero_delay_policy_never_waits() {
        let policy = RetryPolicy::zero_delay();
        for attempt in 0..5 {
            assert_eq!(policy.delay_for(attempt), Duration::ZERO);
        }
    }

    #[test]
    fn jitter_stays_within_half_of_base() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            jitter: true,
        };
        for _ in 0..50 {
            let d = policy.delay_for(0);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(150));
        }
    }
}
