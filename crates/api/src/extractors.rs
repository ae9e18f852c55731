//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use paylane_core::idempotency::{IDEMPOTENCY_KEY_HEADER, IdempotencyKey};
use paylane_shared::AppError;

use crate::ApiError;

/// The optional `Idempotency-Key` header of a mutating request.
///
/// A missing header means the call has no idempotency protection. A present
/// but invalid header rejects the request.
#[derive(Debug, Clone, Default)]
pub struct IdempotencyHeader(pub Option<IdempotencyKey>);

impl IdempotencyHeader {
    /// Returns the key, if one was sent.
    #[must_use]
    pub const fn key(&self) -> Option<&IdempotencyKey> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for IdempotencyHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(IDEMPOTENCY_KEY_HEADER) else {
            return Ok(Self(None));
        };

        let raw = value.to_str().map_err(|_| {
            AppError::Validation("Idempotency key must be visible ASCII".to_string())
        })?;

        Ok(Self(Some(IdempotencyKey::parse(raw)?)))
    }
}
