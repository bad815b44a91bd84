//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `jwt.key`.
pub const JWT_KEY_ENV: &str = "CATALOG_GATEWAY_JWT_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    finalize(config)
}

/// Built-in defaults plus environment overrides, validated.
pub fn default_config() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    if let Ok(key) = std::env::var(JWT_KEY_ENV) {
        if !key.is_empty() {
            config.jwt.key = key;
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_parse_full_config() {
        let toml = format!(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [rate_limit]
            permit_limit = 5
            window_ms = 250
            exempt_prefixes = ["/docs"]

            [jwt]
            issuer = "iss"
            audience = "aud"
            key = "{KEY}"
            lifetime_minutes = 15

            [[directory.roles]]
            id = "r-admin"
            name = "Admin"

            [[directory.users]]
            id = "6f2c1c8e-7a34-4d55-9b3f-2f1f0c6a9e11"
            email = "alice@example.com"
            user_name = "alice"
            name = "Alice"
            surname = "Doe"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
            role_id = "r-admin"
            "#
        );

        let config = parse_config(&toml).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.rate_limit.permit_limit, 5);
        assert_eq!(config.rate_limit.window_ms, 250);
        assert_eq!(config.rate_limit.exempt_prefixes, vec!["/docs".to_string()]);
        // Unset fields keep their defaults.
        assert_eq!(config.rate_limit.idle_windows, 10);
        assert_eq!(config.jwt.lifetime_minutes, 15);
        assert_eq!(config.directory.users[0].role_id, "r-admin");
    }

    #[test]
    fn test_non_numeric_lifetime_is_parse_error() {
        let toml = format!(
            r#"
            [jwt]
            key = "{KEY}"
            lifetime_minutes = "sixty"
            "#
        );
        assert!(matches!(parse_config(&toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_reported() {
        let err = parse_config("[rate_limit]\npermit_limit = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::ZeroPermitLimit));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_values_fail_at_load() {
        let toml = format!(
            r#"
            [rate_limit]
            window_ms = 1000000000000000
            idle_windows = 4000000000

            [jwt]
            key = "{KEY}"
            lifetime_minutes = 1000000000000
            "#
        );
        match parse_config(&toml).unwrap_err() {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::WindowOutOfRange(1_000_000_000_000_000)));
                assert!(errors.contains(&ValidationError::LifetimeOutOfRange(1_000_000_000_000)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
