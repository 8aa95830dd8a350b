use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

/// The HTTP boundary's error taxonomy. Everything a handler can fail with
/// maps onto one of these, and each renders as a JSON `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    /// Rejected login. Same body for unknown email and wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Missing or invalid session on a protected route.
    #[error("authentication required")]
    Unauthorized,
    /// Unexpected store/provider fault. Logged server-side, opaque to the
    /// client.
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("already exists".to_owned())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::NotFound("referenced resource")
            }
            _ => ApiError::Internal(error.into()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Store(e) => ApiError::Internal(e.into()),
            AuthError::Verification(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(error) => {
                tracing::error!(error = ?error, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
