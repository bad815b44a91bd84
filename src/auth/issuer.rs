//! Bearer token issuance.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::auth::claims::{Claims, Principal};
use crate::auth::error::AuthError;
use crate::config::validation::{ValidationError, MAX_LIFETIME_MINUTES, MIN_KEY_BYTES};
use crate::config::{ConfigError, JwtConfig};
use crate::directory::RoleDirectory;
use crate::observability::metrics;

/// Validated token parameters. The key is loaded once and never rotated.
#[derive(Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub audience: String,
    key: Arc<Vec<u8>>,
    pub lifetime: Duration,
}

impl TokenSettings {
    /// Build settings, failing fast on a missing or short key or a zero or
    /// oversized lifetime.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        key: impl Into<Vec<u8>>,
        lifetime_minutes: u64,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let mut errors = Vec::new();
        if key.is_empty() {
            errors.push(ValidationError::MissingSigningKey);
        } else if key.len() < MIN_KEY_BYTES {
            errors.push(ValidationError::WeakSigningKey(key.len()));
        }
        let lifetime = i64::try_from(lifetime_minutes)
            .ok()
            .filter(|_| lifetime_minutes <= MAX_LIFETIME_MINUTES)
            .and_then(Duration::try_minutes);
        match lifetime {
            _ if lifetime_minutes == 0 => errors.push(ValidationError::ZeroLifetime),
            None => errors.push(ValidationError::LifetimeOutOfRange(lifetime_minutes)),
            Some(_) => {}
        }
        let lifetime = match lifetime {
            Some(lifetime) if errors.is_empty() => lifetime,
            _ => return Err(ConfigError::Validation(errors)),
        };

        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            key: Arc::new(key),
            lifetime,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.issuer.clone(),
            config.audience.clone(),
            config.key.as_bytes(),
            config.lifetime_minutes,
        )
    }

    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("key", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Turns a verified principal into a signed, time-bounded HS256 token.
pub struct CredentialIssuer {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    roles: Arc<dyn RoleDirectory>,
}

impl CredentialIssuer {
    pub fn new(settings: TokenSettings, roles: Arc<dyn RoleDirectory>) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.key());
        Self {
            settings,
            encoding_key,
            roles,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Issue a token valid from now for the configured lifetime.
    pub async fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        self.issue_at(principal, Utc::now()).await
    }

    /// Issue a token as if the current time were `now`.
    pub async fn issue_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let role = self
            .roles
            .find_role(&principal.role_id)
            .await?
            .filter(|role| !role.is_deleted)
            .ok_or_else(|| {
                tracing::warn!(
                    user = %principal.user_name,
                    role_id = %principal.role_id,
                    "Token not issued: role does not resolve"
                );
                AuthError::RoleNotFound(principal.role_id.clone())
            })?;

        let expires_at = now
            .checked_add_signed(self.settings.lifetime)
            .ok_or(AuthError::ExpiryOverflow)?;
        let claims = Claims::new(
            principal,
            &role,
            &self.settings.issuer,
            &self.settings.audience,
            now,
            expires_at,
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        metrics::record_token_issued(&role.name);
        tracing::info!(
            user = %principal.user_name,
            role = %role.name,
            expires_at = %expires_at,
            "Issued bearer token"
        );

        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify::TokenVerifier;
    use crate::directory::{InMemoryDirectory, Role};
    use uuid::Uuid;

    const KEY: &str = "an-hmac-key-that-is-long-enough-for-hs256";

    fn principal(role_id: &str) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            user_name: "jdoe".into(),
            name: "John".into(),
            surname: "Doe".into(),
            role_id: role_id.into(),
            is_deleted: false,
        }
    }

    fn setup() -> (CredentialIssuer, TokenVerifier) {
        let directory = InMemoryDirectory::default()
            .with_role(Role {
                id: "r-editor".into(),
                name: "Editor".into(),
                is_deleted: false,
            })
            .with_role(Role {
                id: "r-gone".into(),
                name: "Retired".into(),
                is_deleted: true,
            });
        let settings = TokenSettings::new("catalog", "clients", KEY, 30).unwrap();
        let verifier = TokenVerifier::new(&settings);
        (
            CredentialIssuer::new(settings, Arc::new(directory)),
            verifier,
        )
    }

    #[test]
    fn test_settings_fail_fast() {
        let err = TokenSettings::new("i", "a", "", 10).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref e) if e == &vec![ValidationError::MissingSigningKey]
        ));

        let err = TokenSettings::new("i", "a", "short", 0).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref e)
                if e == &vec![ValidationError::WeakSigningKey(5), ValidationError::ZeroLifetime]
        ));
    }

    #[test]
    fn test_oversized_lifetime_fails_fast() {
        let err = TokenSettings::new("i", "a", KEY, 1_000_000_000_000).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref e)
                if e == &vec![ValidationError::LifetimeOutOfRange(1_000_000_000_000)]
        ));

        let err = TokenSettings::new("i", "a", KEY, u64::MAX).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref e)
                if e == &vec![ValidationError::LifetimeOutOfRange(u64::MAX)]
        ));

        assert!(TokenSettings::new("i", "a", KEY, MAX_LIFETIME_MINUTES).is_ok());
    }

    #[tokio::test]
    async fn test_expiry_past_calendar_end_is_an_error() {
        let (issuer, _) = setup();
        let now = DateTime::<Utc>::MAX_UTC - Duration::minutes(1);

        let err = issuer.issue_at(&principal("r-editor"), now).await.unwrap_err();
        assert!(matches!(err, AuthError::ExpiryOverflow));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = TokenSettings::new("i", "a", KEY, 10).unwrap();
        assert!(!format!("{settings:?}").contains(KEY));
    }

    #[tokio::test]
    async fn test_expiry_matches_lifetime() {
        let (issuer, verifier) = setup();
        let now = Utc::now();

        let issued = issuer.issue_at(&principal("r-editor"), now).await.unwrap();
        let claims = verifier.verify(&issued.token).unwrap();

        assert_eq!(claims.exp, (now + Duration::minutes(30)).timestamp());
        assert_eq!(issued.expires_at, now + Duration::minutes(30));
        assert!(claims.nbf <= now.timestamp());
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.role, "Editor");
        assert_eq!(claims.user_name, "jdoe");
        assert_eq!(claims.iss, "catalog");
        assert_eq!(claims.aud, "clients");
    }

    #[tokio::test]
    async fn test_exactly_one_role_claim() {
        let (issuer, _) = setup();
        let issued = issuer.issue(&principal("r-editor")).await.unwrap();

        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);

        let mut validation = jsonwebtoken::Validation::new(Algorithm::HS256);
        validation.set_audience(&["clients"]);
        let raw = jsonwebtoken::decode::<serde_json::Value>(
            &issued.token,
            &jsonwebtoken::DecodingKey::from_secret(KEY.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        let roles: Vec<_> = raw
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| k.as_str() == "role")
            .collect();
        assert_eq!(roles.len(), 1);
        assert_eq!(raw["role"], serde_json::json!("Editor"));
    }

    #[tokio::test]
    async fn test_tokens_differ_over_time_but_share_identity() {
        let (issuer, verifier) = setup();
        let principal = principal("r-editor");
        let first_at = Utc::now();
        let second_at = first_at + Duration::seconds(5);

        let first = issuer.issue_at(&principal, first_at).await.unwrap();
        let second = issuer.issue_at(&principal, second_at).await.unwrap();
        assert_ne!(first.token, second.token);

        let a = verifier.verify(&first.token).unwrap();
        let b = verifier.verify(&second.token).unwrap();
        assert_ne!(a.iat, b.iat);
        assert!(a.same_identity(&b));
    }

    #[tokio::test]
    async fn test_unknown_role_issues_nothing() {
        let (issuer, _) = setup();
        let err = issuer.issue(&principal("r-missing")).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleNotFound(ref id) if id == "r-missing"));
    }

    #[tokio::test]
    async fn test_deleted_role_does_not_resolve() {
        let (issuer, _) = setup();
        let err = issuer.issue(&principal("r-gone")).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleNotFound(_)));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let (issuer, verifier) = setup();
        let mine = issuer.issue(&principal("r-editor")).await.unwrap();
        let mut other = principal("r-editor");
        other.user_name = "mallory".into();
        let theirs = issuer.issue(&other).await.unwrap();

        // Graft another payload onto this token's signature.
        let mine: Vec<&str> = mine.token.split('.').collect();
        let theirs: Vec<&str> = theirs.token.split('.').collect();
        let spliced = format!("{}.{}.{}", mine[0], theirs[1], mine[2]);

        assert!(verifier.verify(&spliced).is_err());
    }
}
