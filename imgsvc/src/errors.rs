use crate::db::errors::DbError;
use crate::storage::StorageError;
use crate::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload rejected before anything was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed request that never reached validation (e.g. a broken multipart body)
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body over the configured size limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Storage backend error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Storage(storage_err) => match storage_err {
                StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
                StorageError::Configuration { .. }
                | StorageError::InvalidName { .. }
                | StorageError::Io(_)
                | StorageError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::BadRequest { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::Storage(StorageError::NotFound { .. }) => "File not found".to_string(),
            Error::Storage(_) => "Storage error occurred".to_string(),
            Error::Database(DbError::NotFound) => "Resource not found".to_string(),
            Error::Database(DbError::Other(_)) => "Database error occurred".to_string(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Storage(StorageError::NotFound { .. }) | Error::Database(DbError::NotFound) => {
                tracing::debug!("Not found: {}", self);
            }
            Error::Storage(_) | Error::Database(_) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Validation(_) | Error::BadRequest { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        let body = match &self {
            Error::Validation(err) => json!({
                "detail": err.to_string(),
                "code": err.code(),
            }),
            _ => json!({ "detail": self.user_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
