//! Webhook job lifecycle.
//!
//! Jobs are created `Pending` and only the worker moves them on: to
//! `Completed` after a 2xx, back to `Pending` with a later run time after a
//! retryable failure, or to `Failed` once attempts are exhausted or the
//! payload can never be delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::retry::{RetryDecision, RetryPolicy};

/// Outbox job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Waiting for (another) delivery attempt.
    Pending,
    /// Delivered with a 2xx response.
    Completed,
    /// Terminally failed, never attempted again.
    Failed,
}

impl JobStatus {
    /// Returns true if the worker will never pick the job again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Why a delivery attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Receiver answered with a non-2xx status.
    #[error("Receiver responded with status {0}")]
    Status(u16),

    /// Attempt exceeded the request timeout.
    #[error("Delivery timed out")]
    Timeout,

    /// Could not reach the receiver.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request could not be built (e.g. invalid URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Why a job ended up `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Payload is not valid JSON and never will be.
    MalformedPayload,
    /// Retry budget used up.
    AttemptsExhausted,
}

/// State change the worker applies to a claimed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTransition {
    /// Mark `Completed`.
    Complete {
        /// Attempt count to store.
        attempts: i32,
    },
    /// Stay `Pending`, eligible again at `next_run_at`.
    Reschedule {
        /// Attempt count to store.
        attempts: i32,
        /// Next eligible run time.
        next_run_at: DateTime<Utc>,
    },
    /// Mark `Failed`.
    Fail {
        /// Attempt count to store.
        attempts: i32,
        /// Cause.
        reason: FailureReason,
    },
}

impl JobTransition {
    /// Status the job holds after this transition.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        match self {
            Self::Complete { .. } => JobStatus::Completed,
            Self::Reschedule { .. } => JobStatus::Pending,
            Self::Fail { .. } => JobStatus::Failed,
        }
    }
}

/// Transition for a job whose payload could not be parsed.
#[must_use]
pub const fn malformed_payload(previous_attempts: i32) -> JobTransition {
    JobTransition::Fail {
        attempts: previous_attempts,
        reason: FailureReason::MalformedPayload,
    }
}

/// Transition after a delivery attempt on a job already attempted
/// `previous_attempts` times.
#[must_use]
pub fn after_delivery(
    policy: &RetryPolicy,
    previous_attempts: i32,
    result: &Result<(), DeliveryError>,
    now: DateTime<Utc>,
) -> JobTransition {
    if result.is_ok() {
        return JobTransition::Complete {
            attempts: previous_attempts.saturating_add(1),
        };
    }

    match policy.after_failure(previous_attempts) {
        RetryDecision::Retry { attempts, delay } => JobTransition::Reschedule {
            attempts,
            next_run_at: now
                + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::hours(1)),
        },
        RetryDecision::GiveUp { attempts } => JobTransition::Fail {
            attempts,
            reason: FailureReason::AttemptsExhausted,
        },
    }
}
