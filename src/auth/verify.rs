//! Bearer token verification and request identity.
//!
//! Verification only annotates requests. A missing or bad token leaves the
//! request anonymous; handlers that need a caller ask for [`CallerIdentity`]
//! and turn its absence into a 401.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::auth::issuer::TokenSettings;

/// Identity of an authenticated caller, attached to request extensions.
///
/// `name` comes from the `nameid` (username) claim, not the given-name
/// `unique_name` claim. Given names collide between users, so two people
/// called "Anna" would otherwise share one rate limit window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    /// Stable username from `nameid`; also the caller's rate limit partition.
    pub name: String,
    pub role: String,
    pub user_id: Uuid,
    pub is_deleted: bool,
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            name: claims.user_name,
            role: claims.role,
            user_id: claims.user_id,
            is_deleted: claims.is_deleted,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Checks signature, issuer, audience and lifetime of bearer tokens.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud"]);
        validation.validate_nbf = true;

        Self {
            decoding_key: DecodingKey::from_secret(settings.key()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Attach a [`CallerIdentity`] when the request carries a valid bearer token.
pub async fn authenticate(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let identity = bearer_token(request.headers()).and_then(|token| {
        verifier
            .verify(token)
            .map_err(|e| tracing::debug!(error = %e, "Ignoring bearer token"))
            .ok()
    });

    if let Some(claims) = identity {
        request
            .extensions_mut()
            .insert(CallerIdentity::from(claims));
    }

    next.run(request).await
}
