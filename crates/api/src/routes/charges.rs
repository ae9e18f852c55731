//! Card charge route.
//!
//! A charge is approved locally: the card passes the number, expiry, and CVC
//! checks and the amount meets the minimum, then the merchant account is
//! credited. The `payment.succeeded` webhook is written to the outbox in the
//! same transaction as the credit, so it exists exactly when the money does.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};
use paylane_core::{
    card::{CardBrand, validate_card, validate_charge_amount, validate_cvc, validate_expiry},
    webhook::{PaymentSucceeded, WebhookEvent},
};
use paylane_db::{LedgerRepository, OutboxRepository};
use paylane_shared::types::{AccountId, TransactionId};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState, ApiError,
    error::rejected,
    extractors::IdempotencyHeader,
    response::{replay, stored},
};

/// Creates the charge routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/charges", post(charge))
}

/// Request body for a card charge.
#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    /// Card number, spaces and dashes allowed.
    pub card_number: String,
    /// Expiry as `MM/YY`.
    pub expiry: String,
    /// Card verification code.
    pub cvc: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Merchant account to credit.
    pub merchant_id: AccountId,
}

/// Response for an approved charge.
#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    /// Always `success`.
    pub status: &'static str,
    /// Human-readable summary.
    pub message: &'static str,
    /// Detected card brand.
    pub brand: CardBrand,
    /// Amount credited to the merchant.
    pub amount_charged: i64,
    /// Ledger transaction that recorded the charge.
    pub transaction_id: TransactionId,
}

/// Description stamped on the merchant's credit.
fn charge_description(brand: CardBrand) -> String {
    format!("Card Payment: {brand}")
}

/// POST `/charges` - Charge a card into a merchant account.
async fn charge(
    State(state): State<AppState>,
    key: IdempotencyHeader,
    payload: Result<Json<ChargeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;

    validate_charge_amount(req.amount)?;
    let brand = validate_card(&req.card_number)?;
    validate_expiry(&req.expiry)?;
    validate_cvc(&req.cvc)?;

    let merchant_url = state.merchant_url.clone();
    let outcome = state
        .idempotency()
        .run(key.key(), move |txn| {
            Box::pin(async move {
                let transaction = match LedgerRepository::deposit_within(
                    txn,
                    req.merchant_id,
                    req.amount,
                    &charge_description(brand),
                )
                .await
                {
                    Ok(transaction) => transaction,
                    Err(err) => return rejected(err),
                };

                if let Some(url) = merchant_url.as_deref() {
                    let event = WebhookEvent::payment_succeeded(&PaymentSucceeded {
                        transaction_id: transaction.id,
                        merchant_id: req.merchant_id,
                        amount: transaction.amount,
                        currency: transaction.currency,
                        card_brand: Some(brand.to_string()),
                        status: transaction.status.as_str().to_string(),
                    })
                    .and_then(|event| event.to_payload())
                    .map_err(|e| DbErr::Custom(e.to_string()))?;

                    let job_id = OutboxRepository::enqueue(txn, url, &event).await?;
                    info!(job_id = %job_id, transaction_id = %transaction.id, "Payment webhook queued");
                }

                info!(
                    transaction_id = %transaction.id,
                    merchant_id = %req.merchant_id,
                    brand = %brand,
                    amount = req.amount,
                    "Card payment approved"
                );

                stored(
                    StatusCode::OK,
                    &ChargeResponse {
                        status: "success",
                        message: "Payment Approved",
                        brand,
                        amount_charged: transaction.amount,
                        transaction_id: transaction.id,
                    },
                )
            })
        })
        .await?;

    Ok(replay(outcome))
}
