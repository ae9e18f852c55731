//! Account routes: opening accounts, reading them, and their history.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use paylane_core::ledger::{
    Account, Direction, HistoryItem, LedgerError, Transaction, validate_owner_name,
};
use paylane_db::{AccountRepository, LedgerRepository};
use paylane_shared::{AppError, types::{AccountId, Currency}};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, ApiError,
    error::rejected,
    extractors::IdempotencyHeader,
    response::{replay, stored},
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/transactions", get(get_history))
}

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Owner display name.
    pub owner_name: String,
    /// Currency code: USD or TZS.
    pub currency: String,
}

/// Query parameters for account history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Number of entries to return (default 10, max 100).
    pub limit: Option<u64>,
}

/// One line of an account's history.
#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Direction of this account's entry.
    pub direction: Direction,
}

impl From<HistoryItem> for HistoryEntryResponse {
    fn from(item: HistoryItem) -> Self {
        Self {
            transaction: item.transaction,
            direction: item.direction,
        }
    }
}

/// Response for account history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Account the history belongs to.
    pub account_id: AccountId,
    /// Entries, newest first.
    pub transactions: Vec<HistoryEntryResponse>,
}

/// POST `/accounts` - Open an account with a zero balance.
async fn create_account(
    State(state): State<AppState>,
    key: IdempotencyHeader,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;

    validate_owner_name(&req.owner_name)?;
    let currency: Currency = req
        .currency
        .parse()
        .map_err(|_| AppError::Validation("Invalid currency. Use USD or TZS".to_string()))?;

    let outcome = state
        .idempotency()
        .run(key.key(), move |txn| {
            Box::pin(async move {
                match AccountRepository::create_within(txn, &req.owner_name, currency).await {
                    Ok(account) => stored(StatusCode::CREATED, &account),
                    Err(err) => rejected(err),
                }
            })
        })
        .await?;

    Ok(replay(outcome))
}

/// GET `/accounts/{account_id}` - Read an account and its balance.
async fn get_account(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
) -> Result<Json<Account>, ApiError> {
    let Path(account_id) = path?;

    AccountRepository::new((*state.db).clone())
        .find(account_id)
        .await?
        .map(Json)
        .ok_or_else(|| LedgerError::AccountNotFound(account_id).into())
}

/// GET `/accounts/{account_id}/transactions` - Most recent history, newest first.
async fn get_history(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(account_id) = path?;
    let Query(query) = query?;

    let items = LedgerRepository::new((*state.db).clone())
        .history(account_id, query.limit)
        .await?;

    Ok(Json(HistoryResponse {
        account_id,
        transactions: items.into_iter().map(Into::into).collect(),
    }))
}
