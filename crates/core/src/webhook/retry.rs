//! Retry policy for webhook delivery.
//!
//! Backoff is exponential in the number of attempts already made, capped at a
//! maximum delay: `min(base * 2^(attempts - 1), max)`.

use std::time::Duration;

/// Decision taken after a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Keep the job pending and try again after `delay`.
    Retry {
        /// Attempt count to store.
        attempts: i32,
        /// Delay before the job is eligible again.
        delay: Duration,
    },
    /// Attempts exhausted, mark the job failed.
    GiveUp {
        /// Attempt count to store.
        attempts: i32,
    },
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up.
    pub max_attempts: i32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Ceiling for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(3600),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_attempts: i32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Delay before the next attempt once `attempts` attempts have failed.
    #[must_use]
    pub fn backoff(&self, attempts: i32) -> Duration {
        let exponent = u32::try_from(attempts.saturating_sub(1).max(0)).unwrap_or(0);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Decides what happens after a failed attempt on a job that had already
    /// been attempted `previous_attempts` times.
    #[must_use]
    pub fn after_failure(&self, previous_attempts: i32) -> RetryDecision {
        let attempts = previous_attempts.saturating_add(1);
        if attempts >= self.max_attempts {
            RetryDecision::GiveUp { attempts }
        } else {
            RetryDecision::Retry {
                attempts,
                delay: self.backoff(attempts),
            }
        }
    }
}
