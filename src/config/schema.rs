//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Admission control configuration.
    pub rate_limit: RateLimitConfig,

    /// Token issuance settings.
    pub jwt: JwtConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Seed data for the in-memory user/role directory.
    pub directory: DirectoryConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable admission control.
    pub enabled: bool,

    /// Maximum requests admitted per partition within one window.
    pub permit_limit: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Path prefixes (matched case-insensitively) that are never throttled.
    pub exempt_prefixes: Vec<String>,

    /// Partitions idle for this many windows are dropped from memory.
    pub idle_windows: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permit_limit: 20,
            window_ms: 1_000,
            exempt_prefixes: vec!["/swagger".to_string(), "/v1/swagger".to_string()],
            idle_windows: 10,
        }
    }
}

/// Bearer token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// `iss` claim written into every token.
    pub issuer: String,

    /// `aud` claim written into every token.
    pub audience: String,

    /// Symmetric HMAC key. May be left empty and supplied through
    /// `CATALOG_GATEWAY_JWT_KEY` instead.
    pub key: String,

    /// Token lifetime in minutes.
    pub lifetime_minutes: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "catalog-gateway".to_string(),
            audience: "catalog-clients".to_string(),
            key: String::new(),
            lifetime_minutes: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Users and roles served by the in-memory directory.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DirectoryConfig {
    pub roles: Vec<RoleConfig>,
    pub users: Vec<UserConfig>,
}

/// A role record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A user record. `password_hash` is an Argon2 PHC string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub id: uuid::Uuid,
    pub email: String,
    pub user_name: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
    pub role_id: String,
    #[serde(default)]
    pub is_deleted: bool,
}
