//! Gateway endpoints: health, login and caller introspection.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{password, AuthError, CallerIdentity};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Verify the password, then hand the principal to the credential issuer.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let Some(user) = state.principals.find_by_email(request.email.trim()).await? else {
        metrics::record_login_failure("unknown_user");
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password_blocking(request.password, user.password_hash.clone()).await {
        metrics::record_login_failure("bad_password");
        tracing::info!(user = %user.user_name, "Login rejected: bad password");
        return Err(AuthError::InvalidCredentials);
    }

    let issued = state
        .issuer
        .issue(&user.principal())
        .await
        .inspect_err(|_| metrics::record_login_failure("issuance"))?;

    Ok(Json(TokenResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

pub async fn me(identity: CallerIdentity) -> Json<CallerIdentity> {
    Json(identity)
}
