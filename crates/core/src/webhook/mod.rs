//! Webhook outbox domain logic.
//!
//! - `event` - payload envelopes enqueued by business operations
//! - `job` - job statuses and the transitions the worker applies
//! - `retry` - bounded exponential backoff
//! - `signature` - HMAC-SHA256 body signing

pub mod event;
pub mod job;
pub mod retry;
pub mod signature;

#[cfg(test)]
mod retry_props;

pub use event::{PaymentSucceeded, TransferCompleted, WebhookEvent, event_type};
pub use job::{
    DeliveryError, FailureReason, JobStatus, JobTransition, after_delivery, malformed_payload,
};
pub use retry::{RetryDecision, RetryPolicy};
pub use signature::{SIGNATURE_HEADER, WebhookSigner};
