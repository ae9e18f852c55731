//! Outbound webhook event payloads.
//!
//! Delivery is at-least-once, so every event carries a unique `id` that
//! receivers use to discard duplicates.

use chrono::{DateTime, Utc};
use paylane_shared::types::{AccountId, Currency, EventId, TransactionId};
use serde::{Deserialize, Serialize};

/// Event type names.
pub mod event_type {
    /// A charge settled into a merchant account.
    pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
    /// A transfer between two accounts completed.
    pub const TRANSFER_COMPLETED: &str = "transfer.completed";
}

/// Envelope for every outbound webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Unique event id for receiver-side deduplication.
    pub id: EventId,
    /// Event type, e.g. `payment.succeeded`.
    pub event: String,
    /// When the event was produced.
    pub created_at: DateTime<Utc>,
    /// Event-specific data.
    pub data: serde_json::Value,
}

/// Data of a `payment.succeeded` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSucceeded {
    /// Ledger transaction that recorded the payment.
    pub transaction_id: TransactionId,
    /// Credited merchant account.
    pub merchant_id: AccountId,
    /// Amount in minor units.
    pub amount: i64,
    /// Currency.
    pub currency: Currency,
    /// Card brand, when the payment was a card charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_brand: Option<String>,
    /// Transaction status.
    pub status: String,
}

/// Data of a `transfer.completed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCompleted {
    /// Ledger transaction that recorded the transfer.
    pub transaction_id: TransactionId,
    /// Debited account.
    pub from_id: AccountId,
    /// Credited account.
    pub to_id: AccountId,
    /// Amount in minor units.
    pub amount: i64,
    /// Currency.
    pub currency: Currency,
}

impl WebhookEvent {
    /// Wraps `data` in a new envelope.
    pub fn new<T: Serialize>(event: &str, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: EventId::new(),
            event: event.to_string(),
            created_at: Utc::now(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Builds a `payment.succeeded` event.
    pub fn payment_succeeded(payment: &PaymentSucceeded) -> Result<Self, serde_json::Error> {
        Self::new(event_type::PAYMENT_SUCCEEDED, payment)
    }

    /// Builds a `transfer.completed` event.
    pub fn transfer_completed(transfer: &TransferCompleted) -> Result<Self, serde_json::Error> {
        Self::new(event_type::TRANSFER_COMPLETED, transfer)
    }

    /// Serializes the envelope for the outbox.
    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
