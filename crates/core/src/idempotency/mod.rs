//! Idempotency keys and recorded responses.
//!
//! A client tags a mutating request with an opaque key. The first request to
//! complete with a definite outcome records its status and body; every later
//! request with the same key receives those exact bytes without re-running the
//! operation.

use serde::Serialize;
use thiserror::Error;

/// Header carrying the client-supplied key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Header set on responses replayed from a recorded result.
pub const IDEMPOTENCY_HIT_HEADER: &str = "X-Idempotency-Hit";

/// Longest key accepted.
pub const MAX_KEY_LENGTH: usize = 255;

/// Rejected idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdempotencyKeyError {
    /// Key is empty after trimming.
    #[error("Idempotency key must not be empty")]
    Empty,

    /// Key exceeds `MAX_KEY_LENGTH`.
    #[error("Idempotency key must be at most 255 characters, got {0}")]
    TooLong(usize),

    /// Key contains control characters.
    #[error("Idempotency key must be printable")]
    NotPrintable,
}

/// A validated client-supplied idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validates and wraps a raw key.
    pub fn parse(raw: &str) -> Result<Self, IdempotencyKeyError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(IdempotencyKeyError::Empty);
        }
        let len = key.chars().count();
        if len > MAX_KEY_LENGTH {
            return Err(IdempotencyKeyError::TooLong(len));
        }
        if key.chars().any(char::is_control) {
            return Err(IdempotencyKeyError::NotPrintable);
        }
        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status and body of a response, as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    /// HTTP status code.
    pub status: u16,
    /// Serialized JSON body.
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Serializes `body` once so the first response and every replay share the same bytes.
    pub fn json<T: Serialize>(status: u16, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status,
            body: serde_json::to_vec(body)?,
        })
    }

    /// Returns true if this response describes a definite outcome worth replaying.
    ///
    /// Server errors leave the outcome unknown; they are never recorded so the
    /// client can retry with the same key.
    #[must_use]
    pub const fn is_recordable(&self) -> bool {
        self.status < 500
    }
}

/// Result of running an operation under an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotentOutcome {
    /// Response to send.
    pub response: StoredResponse,
    /// True when the response was replayed from an earlier request.
    pub replayed: bool,
}

impl IdempotentOutcome {
    /// Wraps a freshly computed response.
    #[must_use]
    pub const fn fresh(response: StoredResponse) -> Self {
        Self {
            response,
            replayed: false,
        }
    }

    /// Wraps a replayed response.
    #[must_use]
    pub const fn replayed(response: StoredResponse) -> Self {
        Self {
            response,
            replayed: true,
        }
    }
}
