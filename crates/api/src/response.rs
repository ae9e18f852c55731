//! Responses produced under the idempotency guard.
//!
//! A guarded handler serializes its body exactly once into a [`StoredResponse`];
//! the first caller and every replay are sent those same bytes.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use paylane_core::idempotency::{IDEMPOTENCY_HIT_HEADER, IdempotentOutcome, StoredResponse};
use sea_orm::DbErr;
use serde::Serialize;

/// Serializes `body` for the guard.
pub fn stored<T: Serialize>(status: StatusCode, body: &T) -> Result<StoredResponse, DbErr> {
    StoredResponse::json(status.as_u16(), body).map_err(|e| DbErr::Custom(e.to_string()))
}

/// Renders a guard outcome, marking replays.
pub fn replay(outcome: IdempotentOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let response = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        outcome.response.body,
    );

    if outcome.replayed {
        ([(IDEMPOTENCY_HIT_HEADER, "true")], response).into_response()
    } else {
        response.into_response()
    }
}
