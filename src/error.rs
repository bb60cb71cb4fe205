use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{auth::TokenError, repository::RepoError, views::RenderError};

/// AppError
///
/// Anything a handler cannot recover from. Every variant is logged and surfaced to the
/// client as the same generic 500; identity failures never reach this type, and routing
/// misses are answered by the fallback.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("data access failed: {0}")]
    Repository(#[from] RepoError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
