use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::TokenError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0}")]
    Unauthenticated(#[from] TokenError),

    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(TokenError::Missing) => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                "Internal Server Error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(tokio::task::JoinError);

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(%err, "rejected request body");
        Self::InvalidInput("Invalid request")
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!(%err, "rejected path parameter");
        Self::InvalidInput("Invalid request")
    }
}

/// Unwraps a required text field, or fails with `InvalidInput`
/// when it is absent or blank. The value itself is kept untouched.
pub fn required(field: Option<String>) -> AppResult<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::InvalidInput("Invalid request")),
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// For writes keyed by the caller's id: a foreign key failure there means the
/// token names a user that no longer exists, so the token is treated as invalid.
pub fn unknown_caller(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        tracing::debug!(%err, "token subject has no user row");
        AppError::Unauthenticated(TokenError::Invalid)
    } else {
        err.into()
    }
}
