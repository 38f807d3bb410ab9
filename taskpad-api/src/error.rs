//! Error handling for the dispatcher
//!
//! Handlers return `ApiResult<Envelope>`. Failures are [`ApiError`] values
//! that turn into an error [`Envelope`] with the matching status, so nothing
//! escapes the dispatcher as anything other than an envelope.
//!
//! # Example
//!
//! ```
//! use taskpad_api::error::{ApiError, ApiResult};
//! use taskpad_api::envelope::Envelope;
//!
//! fn handler(found: bool) -> ApiResult<Envelope> {
//!     if !found {
//!         return Err(ApiError::NotFound("Task not found".to_string()));
//!     }
//!     Ok(Envelope::ok("Task retrieved successfully", serde_json::json!({})))
//! }
//!
//! let envelope = handler(false).unwrap_or_else(ApiError::into_envelope);
//! assert_eq!(envelope.status, 404);
//! assert!(!envelope.success);
//! ```

use crate::envelope::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use taskpad_shared::{auth::AuthError, storage::StorageError, store::StoreError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - missing or invalid fields
    BadRequest(String),

    /// Unauthorized (401) - missing/unknown token or bad credentials
    Unauthorized(String),

    /// Forbidden (403) - acting on another user's record
    Forbidden(String),

    /// Not found (404) - unknown route or record
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts into the error envelope
    ///
    /// Internal errors are logged with their details; clients only see a
    /// generic message.
    pub fn into_envelope(self) -> Envelope {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        Envelope::new(status, message, None)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}

/// Convert auth service errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::Store(e) => e.into(),
            AuthError::Storage(e) => e.into(),
            AuthError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
        }
    }
}

/// Convert record store errors to API errors
///
/// A patch that does not fit the record shape is the caller's fault; every
/// other store failure is internal.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPatch(msg) => ApiError::BadRequest(format!("Invalid fields: {}", msg)),
            other => ApiError::InternalError(format!("Store error: {}", other)),
        }
    }
}

/// Convert storage errors to API errors
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::InternalError(format!("Storage error: {}", err))
    }
}

/// Convert serialization errors to API errors
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InternalError(format!("Serialization error: {}", err))
    }
}
