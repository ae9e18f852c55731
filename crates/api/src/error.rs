//! Error responses.
//!
//! Every rejection renders as `{ "error": CODE, "message": ..., "retryable": bool }`
//! so a client can tell a validation failure from a business rule failure from
//! an infrastructure failure, and knows whether a retry is safe.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use paylane_core::{
    card::CardError,
    idempotency::{IdempotencyKeyError, StoredResponse},
    ledger::LedgerError,
};
use paylane_db::PostingError;
use paylane_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use crate::response::stored;

/// A failed request, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    retryable: bool,
}

impl ApiError {
    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// JSON body of the response.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": self.code,
            "message": self.message,
            "retryable": self.retryable,
        })
    }

    fn new(status: u16, code: &'static str, message: String, retryable: bool) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message,
            retryable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(
            err.status_code(),
            err.error_code(),
            err.to_string(),
            err.is_retryable(),
        )
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::new(
            err.http_status_code(),
            err.error_code(),
            err.to_string(),
            err.is_retryable(),
        )
    }
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        Self::new(400, err.error_code(), err.to_string(), false)
    }
}

impl From<IdempotencyKeyError> for ApiError {
    fn from(err: IdempotencyKeyError) -> Self {
        AppError::Validation(err.to_string()).into()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        error!(error = %err, "Database error");
        AppError::Database("the outcome of the operation is unknown".to_string()).into()
    }
}

impl From<PostingError> for ApiError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::Rule(err) => err.into(),
            PostingError::Database(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text()).into()
    }
}

/// Turns a failed posting inside the idempotency guard into its response.
///
/// Rule failures are definite outcomes and become a recordable response; a
/// store failure propagates so the guard rolls back and records nothing.
pub(crate) fn rejected(err: PostingError) -> Result<StoredResponse, DbErr> {
    match err {
        PostingError::Rule(err) => {
            let err = ApiError::from(err);
            stored(err.status, &err.body())
        }
        PostingError::Database(err) => Err(err),
    }
}
