//! Unified API error handling.
//!
//! Every component-level failure is turned into a structured JSON response
//! with a stable `message` and, where safe, an `error` detail string. Nothing
//! escapes the boundary unhandled.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::StoreError;

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Authentication failures (401)
    MissingCredential,
    InvalidToken,
    UnknownIdentity,
    InvalidCredentials,

    // Request failures (400)
    ValidationError,
    ImmutableFieldViolation,
    InvalidRecord,
    DuplicateEmail,

    // Lookup failures (404)
    NotFound,

    // Persistence failures
    PersistenceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingCredential => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::UnknownIdentity => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::ImmutableFieldViolation => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidRecord => StatusCode::BAD_REQUEST,
            ErrorCode::DuplicateEmail => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable human-readable error message
    pub message: String,
    /// Optional diagnostic detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// Create a new API error with a specific code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach a diagnostic detail string to the error
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The code this error carries
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    // -------------------------------------------------------------------------
    // Convenience constructors for common error types
    // -------------------------------------------------------------------------

    /// No usable credential was presented (401)
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingCredential, message)
    }

    /// The presented token failed verification (401)
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::InvalidToken, "Invalid token")
    }

    /// The token verified but names no known user (401)
    pub fn unknown_identity(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownIdentity, message)
    }

    /// Login with a wrong email or password (401)
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// A request payload failed schema validation (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// A payload tried to change an immutable field (400)
    pub fn immutable_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ImmutableFieldViolation, message)
    }

    /// The resulting record would violate a field constraint (400)
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRecord, message)
    }

    /// A record with this email already exists (400)
    pub fn duplicate_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateEmail, message)
    }

    /// Not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// The storage backend did not answer in time (503, transient)
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceUnavailable, message)
    }

    /// Internal server error (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let response = ErrorResponse {
            message: self.message,
            error: self.detail,
        };

        (status, Json(response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

// -------------------------------------------------------------------------
// Conversion implementations for common error types
// -------------------------------------------------------------------------

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found("Employee not found"),
            StoreError::DuplicateEmail => {
                ApiError::duplicate_email("Employee with this email already exists")
            }
            StoreError::InvalidRecord(message) => ApiError::invalid_record(message),
            StoreError::Unavailable(source) => {
                tracing::error!(error = %source, "Storage backend timed out");
                ApiError::unavailable("Storage backend is unavailable, try again later")
            }
            StoreError::Database(source) => {
                tracing::error!(error = %source, "Database error");
                ApiError::internal("A database error occurred")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from(StoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(
            ErrorCode::MissingCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::UnknownIdentity.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ImmutableFieldViolation.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DuplicateEmail.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::PersistenceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::not_found("Employee not found");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Employee not found");
        assert!(err.detail.is_none());
    }

    #[test]
    fn test_detail_is_attached() {
        let err = ApiError::invalid_token().with_detail("signature mismatch");
        assert_eq!(err.code, ErrorCode::InvalidToken);
        assert_eq!(err.message, "Invalid token");
        assert_eq!(err.detail.as_deref(), Some("signature mismatch"));
    }

    #[test]
    fn test_store_error_mapping() {
        let err = ApiError::from(StoreError::NotFound);
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ApiError::from(StoreError::DuplicateEmail);
        assert_eq!(err.code, ErrorCode::DuplicateEmail);

        let err = ApiError::from(StoreError::InvalidRecord("bad record".to_string()));
        assert_eq!(err.code, ErrorCode::InvalidRecord);
        assert_eq!(err.message, "bad record");
    }
}
