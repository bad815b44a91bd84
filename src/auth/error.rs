//! Authentication error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::directory::DirectoryError;
use crate::http::response::ErrorBody;

/// Errors raised while authenticating callers or issuing tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login request without email or password.
    #[error("email and password are required")]
    MissingCredentials,

    /// Unknown user or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The principal's role reference does not resolve to a live role.
    #[error("role '{0}' not found")]
    RoleNotFound(String),

    /// No verified identity on the request.
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// `now + lifetime` does not fit the calendar.
    #[error("token expiry overflows the calendar")]
    ExpiryOverflow,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::RoleNotFound(_)
            | AuthError::Unauthenticated
            | AuthError::InvalidToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::Directory(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Signing(_) | AuthError::ExpiryOverflow | AuthError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller.
    fn public_message(&self) -> String {
        match self {
            AuthError::RoleNotFound(_) => "Authentication failed".to_string(),
            AuthError::Directory(_) => "User directory unavailable".to_string(),
            AuthError::Signing(_) | AuthError::ExpiryOverflow | AuthError::PasswordHash(_) => {
                "Internal authentication error".to_string()
            }
            other => {
                let mut message = other.to_string();
                if let Some(first) = message.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                message
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication failure");
        } else {
            tracing::debug!(error = %self, "Authentication rejected");
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
