//! Money movement routes: deposits and transfers.
//!
//! Both are mutating endpoints run under the idempotency guard. Input checks
//! that need no store access reject the request before the guard opens a
//! transaction.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};
use paylane_core::{
    ledger::{Transaction, validate_amount, validate_transfer},
    webhook::{TransferCompleted, WebhookEvent},
};
use paylane_db::{LedgerRepository, OutboxRepository};
use paylane_shared::types::AccountId;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState, ApiError,
    error::rejected,
    extractors::IdempotencyHeader,
    response::{replay, stored},
};

/// Description used when a deposit request carries none.
pub const DEFAULT_DEPOSIT_DESCRIPTION: &str = "Manual Deposit";

/// Creates the deposit and transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/transfer", post(transfer))
}

/// Request body for a deposit.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Account to credit.
    pub account_id: AccountId,
    /// Amount in minor units.
    pub amount: i64,
    /// Optional description.
    pub description: Option<String>,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account to debit.
    pub from_id: AccountId,
    /// Account to credit.
    pub to_id: AccountId,
    /// Amount in minor units.
    pub amount: i64,
}

/// Response for a posted movement.
#[derive(Debug, Serialize)]
pub struct PostingResponse {
    /// Always `success`.
    pub status: &'static str,
    /// Human-readable summary.
    pub message: &'static str,
    /// The recorded transaction.
    pub transaction: Transaction,
}

/// POST `/deposit` - Credit an account from outside the ledger.
async fn deposit(
    State(state): State<AppState>,
    key: IdempotencyHeader,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    validate_amount(req.amount)?;

    let description = req
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DEPOSIT_DESCRIPTION.to_string());

    let outcome = state
        .idempotency()
        .run(key.key(), move |txn| {
            Box::pin(async move {
                match LedgerRepository::deposit_within(txn, req.account_id, req.amount, &description)
                    .await
                {
                    Ok(transaction) => stored(
                        StatusCode::OK,
                        &PostingResponse {
                            status: "success",
                            message: "Money Deposited!",
                            transaction,
                        },
                    ),
                    Err(err) => rejected(err),
                }
            })
        })
        .await?;

    Ok(replay(outcome))
}

/// POST `/transfer` - Move money between two accounts.
///
/// When a merchant webhook URL is configured, a `transfer.completed` event is
/// written to the outbox in the same transaction as the transfer.
async fn transfer(
    State(state): State<AppState>,
    key: IdempotencyHeader,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    validate_transfer(req.from_id, req.to_id, req.amount)?;

    let merchant_url = state.merchant_url.clone();
    let outcome = state
        .idempotency()
        .run(key.key(), move |txn| {
            Box::pin(async move {
                let transaction =
                    match LedgerRepository::transfer_within(txn, req.from_id, req.to_id, req.amount)
                        .await
                    {
                        Ok(transaction) => transaction,
                        Err(err) => return rejected(err),
                    };

                if let Some(url) = merchant_url.as_deref() {
                    let event = WebhookEvent::transfer_completed(&TransferCompleted {
                        transaction_id: transaction.id,
                        from_id: req.from_id,
                        to_id: req.to_id,
                        amount: transaction.amount,
                        currency: transaction.currency,
                    })
                    .and_then(|event| event.to_payload())
                    .map_err(|e| DbErr::Custom(e.to_string()))?;

                    let job_id = OutboxRepository::enqueue(txn, url, &event).await?;
                    info!(job_id = %job_id, transaction_id = %transaction.id, "Transfer webhook queued");
                }

                stored(
                    StatusCode::OK,
                    &PostingResponse {
                        status: "success",
                        message: "Transfer Complete!",
                        transaction,
                    },
                )
            })
        })
        .await?;

    Ok(replay(outcome))
}
