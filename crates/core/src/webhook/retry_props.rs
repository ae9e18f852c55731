//! Property-based tests for the webhook retry policy.

use std::time::Duration;

use proptest::prelude::*;

use super::job::{DeliveryError, JobTransition, after_delivery};
use super::retry::{RetryDecision, RetryPolicy};

fn policy_strategy() -> impl Strategy<Value = RetryPolicy> {
    (1i32..10, 1u64..120, 120u64..86_400).prop_map(|(max_attempts, base, max)| {
        RetryPolicy::new(max_attempts, Duration::from_secs(base), Duration::from_secs(max))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Backoff never decreases as attempts grow and never exceeds the ceiling.
    #[test]
    fn prop_backoff_monotonic_and_bounded(policy in policy_strategy(), attempts in 1i32..64) {
        let current = policy.backoff(attempts);
        let next = policy.backoff(attempts + 1);
        prop_assert!(next >= current);
        prop_assert!(next <= policy.max_delay);
    }

    /// A job that keeps failing is given up after exactly `max_attempts` attempts.
    #[test]
    fn prop_failures_give_up_at_cap(policy in policy_strategy()) {
        let mut attempts = 0;
        let mut tries = 0;
        loop {
            tries += 1;
            match policy.after_failure(attempts) {
                RetryDecision::Retry { attempts: next, .. } => attempts = next,
                RetryDecision::GiveUp { attempts: last } => {
                    prop_assert_eq!(last, policy.max_attempts);
                    break;
                }
            }
            prop_assert!(tries <= policy.max_attempts);
        }
        prop_assert_eq!(tries, policy.max_attempts);
    }

    /// A success on any attempt before the cap completes the job.
    #[test]
    fn prop_success_always_completes(policy in policy_strategy(), previous in 0i32..10) {
        let now = chrono::Utc::now();
        let transition = after_delivery(&policy, previous, &Ok(()), now);
        prop_assert_eq!(transition, JobTransition::Complete { attempts: previous + 1 });
    }

    /// A rescheduled job is never eligible earlier than now.
    #[test]
    fn prop_reschedule_is_in_future(policy in policy_strategy(), previous in 0i32..10) {
        let now = chrono::Utc::now();
        if let JobTransition::Reschedule { next_run_at, .. } =
            after_delivery(&policy, previous, &Err(DeliveryError::Timeout), now)
        {
            prop_assert!(next_run_at > now);
        }
    }
}
