//! Application error type and HTTP mapping.
//!
//! Every failure the service surfaces goes through [`AppError`]. Variants
//! correspond to the error taxonomy callers can act on; anything else is
//! collapsed into `Internal` with an [`anyhow::Error`] carrying context.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input, or a reference that does not resolve
    /// to an entity of the expected kind.
    Validation(String),
    /// The targeted id does not exist.
    NotFound(String),
    /// Uniqueness violation or a lost concurrent-write race. Retryable.
    Conflict(String),
    /// A state-machine transition attempted from a non-eligible state.
    InvalidState(String),
    /// Role-gated operation attempted by an ineligible caller.
    Unauthorized(String),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::InvalidState(msg)
            | Self::Unauthorized(msg) => f.write_str(msg),
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal error");
            // Do not leak internals to the client.
            let body = Json(json!({ "error": "Internal server error" }));
            return (status, body).into_response();
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Classify database errors so constraint violations surface as the
/// caller-actionable variants rather than opaque 500s.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict("A record with this value already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Validation("Referenced entity does not exist".to_string());
            }
        }
        Self::Internal(anyhow::Error::from(err).context("database operation failed"))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(anyhow::Error::from(err).context("password hashing failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found("gone").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("dup").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::invalid_state("resolved").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::unauthorized("nope").status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::not_found("User with id 42 not found");
        assert_eq!(err.to_string(), "User with id 42 not found");
    }

    #[test]
    fn test_sqlx_row_not_found_is_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
