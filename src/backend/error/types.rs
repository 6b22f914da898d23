/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Request Errors
 *
 * Returned to the caller as-is:
 * - `NotFound` (404), including resources the caller may not see
 * - `Unauthorized` (401), missing or invalid credentials
 * - `Forbidden` (403), authenticated but not allowed
 * - `Conflict` (409), duplicates and invalid state transitions
 * - `RateLimited` (429)
 * - validation failures from the shared module (400)
 *
 * ## Store Errors
 *
 * `sqlx` errors are classified: a missing row is 404, a unique constraint
 * violation is 409, anything else is a 500 whose details are logged and
 * never sent to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use codepocket::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("Snippet not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded; the client may retry after `retry_after` seconds
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },

    /// Store error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error whose details are not exposed to clients
    #[error("Internal error: {0}")]
    Internal(String),

    /// Shared error (validation, serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Whether a store error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Map a unique violation to `Conflict(message)`, keeping other errors
    pub fn on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(message.into())
        } else {
            Self::Database(err)
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(err) if is_unique_violation(err) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    ///
    /// Server-side failures get a generic message; the details go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Conflict(message) => message.clone(),
            Self::RateLimited { .. } => "Too many requests".to_string(),
            Self::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            Self::Database(err) if is_unique_violation(err) => "Already exists".to_string(),
            Self::Database(_) | Self::Internal(_) | Self::SerializationError(_) => {
                "Internal server error".to_string()
            }
            Self::SharedError(err @ SharedError::ValidationError { .. }) => err.to_string(),
            Self::SharedError(SharedError::SerializationError { .. }) => {
                "Internal server error".to_string()
            }
        }
    }
}
