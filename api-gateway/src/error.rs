//! Error handling for the API gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorInfo,
    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (string identifier for the error type)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Common(#[from] Error),
}

impl ApiError {
    /// Status code and stable error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Common(e) => match e {
                // Client errors (4xx)
                Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                Error::InsufficientBalance(_) => (StatusCode::BAD_REQUEST, "insufficient_balance"),
                Error::AccountNotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),

                // Server errors (5xx)
                Error::Storage(_) | Error::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure")
                }
                Error::InconsistentState(_) => (StatusCode::INTERNAL_SERVER_ERROR, "inconsistent_state"),
                Error::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
                Error::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
                Error::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error"),
                Error::DecimalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "decimal_error"),
                Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Generate a request ID for tracking errors
        let request_id = Uuid::new_v4().to_string();

        let (status, code) = self.status_and_code();
        match &self {
            ApiError::Common(Error::InconsistentState(_)) => {
                tracing::error!("API Error [{}]: needs manual reconciliation: {:?}", request_id, &self)
            }
            _ if status.is_server_error() => tracing::error!("API Error [{}]: {:?}", request_id, &self),
            _ => tracing::debug!("API Error [{}]: {:?}", request_id, &self),
        }

        let details = match &self {
            ApiError::Common(Error::Database(e)) => Some(serde_json::json!({
                "db_error": e.to_string(),
                "code": e.as_database_error().map(|dbe| dbe.code().map(|c| c.to_string())),
            })),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}
