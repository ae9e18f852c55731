//! Webhook delivery for Paylane.
//!
//! - `client` - signed HTTP POST of a stored payload
//! - `worker` - background task draining the outbox
//!
//! Delivery is at-least-once. Receivers deduplicate on the event `id`.

pub mod client;
pub mod worker;

pub use client::{USER_AGENT, WebhookClient, WebhookSender};
pub use worker::{WebhookWorker, retry_policy};
