use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected user input for a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("storage unavailable: {0}")]
    ConnectionFailure(String),

    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
