//! Error types for the papers exchange
//!
//! This module provides a unified error handling system for all services
//! of the exchange. Business-rule rejections of a trade (not enough cash,
//! not enough papers, unknown paper) are *not* errors; they are reported as
//! `TradeOutcome` values. Everything here is a fault the caller cannot fix by
//! changing the trade parameters, except `ValidationError`.

use std::fmt::Display;
use thiserror::Error;

/// Exchange error type
#[derive(Debug, Error)]
pub enum Error {
    /// Generic validation error (non-positive quantity, empty paper name, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error when the ledger has no account for a user
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Error when a withdrawal exceeds the available cash
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// A store or cache operation failed
    #[error("Storage failure: {0}")]
    Storage(String),

    /// A compensating action failed after an earlier step had already failed.
    /// Durable state is inconsistent and needs manual reconciliation.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion or arithmetic overflow
    #[error("Decimal error: {0}")]
    DecimalError(String),
}

impl Error {
    /// Whether the error came from a store rather than from the request itself
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Database(_))
    }

    /// Prefix the message with context, keeping the variant
    pub fn context(self, context: impl Display) -> Error {
        match self {
            Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", context, msg)),
            Error::AccountNotFound(msg) => Error::AccountNotFound(format!("{}: {}", context, msg)),
            Error::InsufficientBalance(msg) => Error::InsufficientBalance(format!("{}: {}", context, msg)),
            Error::Storage(msg) => Error::Storage(format!("{}: {}", context, msg)),
            Error::InconsistentState(msg) => Error::InconsistentState(format!("{}: {}", context, msg)),
            Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
            Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
            // sqlx errors are flattened so the context survives
            Error::Database(e) => Error::Storage(format!("{}: {}", context, e)),
            Error::Migration(e) => Error::Migration(e),
            Error::Serialization(e) => Error::Serialization(e),
            Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| e.context(context_fn()))
    }
}

/// Trait for converting other error types to our Error type
pub trait IntoError {
    /// Convert to Error
    fn into_error(self, message: &str) -> Error;
}

impl<E: std::error::Error> IntoError for E {
    fn into_error(self, message: &str) -> Error {
        Error::Internal(format!("{}: {}", message, self))
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_variant() {
        let result: Result<()> = Err(Error::Storage("connection reset".to_string()));
        let err = result.with_context(|| "Failed to debit ledger").unwrap_err();
        match err {
            Error::Storage(msg) => assert_eq!(msg, "Failed to debit ledger: connection reset"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn storage_classification() {
        assert!(Error::Storage("x".into()).is_storage_failure());
        assert!(!Error::ValidationError("x".into()).is_storage_failure());
        assert!(!Error::InconsistentState("x".into()).is_storage_failure());
    }
}
