//! Boundary error taxonomy.
//!
//! Every failure that reaches a client falls into one of four classes. The
//! class fixes the HTTP status, the machine-readable code, and whether the
//! client may retry:
//!
//! | class | status | retry |
//! |---|---|---|
//! | validation | 400 | no, the request itself is wrong |
//! | not found | 404 | no |
//! | business rule | 422 | no, the unit of work was aborted cleanly |
//! | infrastructure | 500 | only with an idempotency key, the outcome is unknown |

use thiserror::Error;

/// Error returned across the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Input rejected before any unit of work opened.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A rule aborted the operation without effect.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// The store failed; the operation may or may not have taken effect.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::BusinessRule(_) => 422,
            Self::Database(_) => 500,
        }
    }

    /// Code sent in the `error` field of the response body.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// True when the outcome is unknown and a keyed retry is safe.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR", false)]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND", false)]
    #[case(AppError::BusinessRule(String::new()), 422, "BUSINESS_RULE_VIOLATION", false)]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR", true)]
    fn test_error_classes(
        #[case] err: AppError,
        #[case] status: u16,
        #[case] code: &str,
        #[case] retryable: bool,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
        assert_eq!(err.is_retryable(), retryable);
    }

    #[test]
    fn test_message_is_prefixed_by_class() {
        assert_eq!(
            AppError::Validation("bad currency".into()).to_string(),
            "Validation error: bad currency"
        );
        assert_eq!(
            AppError::Database("timeout".into()).to_string(),
            "Database error: timeout"
        );
    }
}
