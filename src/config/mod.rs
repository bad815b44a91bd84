//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the signing key is never rotated at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any config error is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config, parse_config, ConfigError};
pub use schema::DirectoryConfig;
pub use schema::GatewayConfig;
pub use schema::JwtConfig;
pub use schema::ObservabilityConfig;
pub use schema::RateLimitConfig;
pub use schema::{RoleConfig, UserConfig};
