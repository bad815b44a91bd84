//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window and lifetime non-zero and bounded)
//! - Check the signing key is present and long enough for HS256
//! - Check referential integrity (users reference existing roles)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Minimum HMAC-SHA-256 key length in bytes.
pub const MIN_KEY_BYTES: usize = 32;

/// Longest accepted rate limit window: one day.
pub const MAX_WINDOW_MS: u64 = 24 * 60 * 60 * 1_000;

/// Longest accepted token lifetime: one year.
pub const MAX_LIFETIME_MINUTES: u64 = 365 * 24 * 60;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("rate_limit.permit_limit must be greater than zero")]
    ZeroPermitLimit,

    #[error("rate_limit.window_ms must be greater than zero")]
    ZeroWindow,

    #[error("rate_limit.window_ms {0} exceeds {MAX_WINDOW_MS}")]
    WindowOutOfRange(u64),

    #[error("rate_limit.idle_windows must be greater than zero")]
    ZeroIdleWindows,

    #[error("rate_limit.exempt_prefixes entry '{0}' must start with '/'")]
    ExemptPrefix(String),

    #[error("jwt.key is missing")]
    MissingSigningKey,

    #[error("jwt.key must be at least {MIN_KEY_BYTES} bytes, got {0}")]
    WeakSigningKey(usize),

    #[error("jwt.lifetime_minutes must be greater than zero")]
    ZeroLifetime,

    #[error("jwt.lifetime_minutes {0} exceeds {MAX_LIFETIME_MINUTES}")]
    LifetimeOutOfRange(u64),

    #[error("jwt.issuer must not be empty")]
    EmptyIssuer,

    #[error("jwt.audience must not be empty")]
    EmptyAudience,

    #[error("user '{user}' references unknown role '{role}'")]
    UnknownRole { user: String, role: String },
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let rl = &config.rate_limit;
    if rl.permit_limit == 0 {
        errors.push(ValidationError::ZeroPermitLimit);
    }
    if rl.window_ms == 0 {
        errors.push(ValidationError::ZeroWindow);
    } else if rl.window_ms > MAX_WINDOW_MS {
        errors.push(ValidationError::WindowOutOfRange(rl.window_ms));
    }
    if rl.idle_windows == 0 {
        errors.push(ValidationError::ZeroIdleWindows);
    }
    for prefix in &rl.exempt_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::ExemptPrefix(prefix.clone()));
        }
    }

    let jwt = &config.jwt;
    if jwt.key.is_empty() {
        errors.push(ValidationError::MissingSigningKey);
    } else if jwt.key.len() < MIN_KEY_BYTES {
        errors.push(ValidationError::WeakSigningKey(jwt.key.len()));
    }
    if jwt.lifetime_minutes == 0 {
        errors.push(ValidationError::ZeroLifetime);
    } else if jwt.lifetime_minutes > MAX_LIFETIME_MINUTES {
        errors.push(ValidationError::LifetimeOutOfRange(jwt.lifetime_minutes));
    }
    if jwt.issuer.is_empty() {
        errors.push(ValidationError::EmptyIssuer);
    }
    if jwt.audience.is_empty() {
        errors.push(ValidationError::EmptyAudience);
    }

    for user in &config.directory.users {
        if !config.directory.roles.iter().any(|r| r.id == user.role_id) {
            errors.push(ValidationError::UnknownRole {
                user: user.user_name.clone(),
                role: user.role_id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RoleConfig, UserConfig};

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.jwt.key = "k".repeat(MIN_KEY_BYTES);
        config
    }

    #[test]
    fn test_defaults_with_key_are_valid() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = GatewayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingSigningKey]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.jwt.key = "short".into();
        config.jwt.lifetime_minutes = 0;
        config.rate_limit.window_ms = 0;
        config.rate_limit.exempt_prefixes.push("docs".into());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::WeakSigningKey(5)));
        assert!(errors.contains(&ValidationError::ZeroLifetime));
        assert!(errors.contains(&ValidationError::ZeroWindow));
        assert!(errors.contains(&ValidationError::ExemptPrefix("docs".into())));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_oversized_window_and_lifetime_rejected() {
        let mut config = valid();
        config.rate_limit.window_ms = 1_000_000_000_000_000;
        config.rate_limit.idle_windows = 4_000_000_000;
        config.jwt.lifetime_minutes = 1_000_000_000_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::WindowOutOfRange(1_000_000_000_000_000),
                ValidationError::LifetimeOutOfRange(1_000_000_000_000),
            ]
        );

        config.rate_limit.window_ms = MAX_WINDOW_MS;
        config.jwt.lifetime_minutes = MAX_LIFETIME_MINUTES;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_user_role_reference() {
        let mut config = valid();
        config.directory.roles.push(RoleConfig {
            id: "r1".into(),
            name: "Admin".into(),
            is_deleted: false,
        });
        config.directory.users.push(UserConfig {
            id: uuid::Uuid::new_v4(),
            email: "a@example.com".into(),
            user_name: "alice".into(),
            name: "Alice".into(),
            surname: "Doe".into(),
            password_hash: String::new(),
            role_id: "missing".into(),
            is_deleted: false,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownRole {
                user: "alice".into(),
                role: "missing".into()
            }]
        );
    }
}
