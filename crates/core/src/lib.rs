//! Core business logic for Paylane.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Accounts, transactions, and double-entry rules
//! - `idempotency` - Client-supplied keys and recorded responses
//! - `webhook` - Outbox job lifecycle, retry policy, and body signing
//! - `card` - Card number and expiry checks for charges

pub mod card;
pub mod idempotency;
pub mod ledger;
pub mod webhook;
