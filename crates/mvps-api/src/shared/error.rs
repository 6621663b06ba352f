//! API Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Constraint violation: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Machine-readable code and HTTP status for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Conflict { .. } => (StatusCode::CONFLICT, "CONSTRAINT_VIOLATION"),
            ApiError::Database(_) | ApiError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return ApiError::Conflict {
                    message: "The operation violates a data constraint. A related record may \
                              already exist or a required reference is missing."
                        .to_string(),
                };
            }
        }
        ApiError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error details
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Storage faults are logged in full and reported generically
        let message = match &self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Storage failure");
                "An unexpected error occurred".to_string()
            }
            ApiError::Internal { message } => {
                tracing::error!(error = %message, "Internal failure");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
