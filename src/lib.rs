//! Catalog gateway library.
//!
//! Front door for the catalog API: issues signed bearer tokens at login and
//! admits or rejects each request through a per-caller fixed-window limiter.

pub mod auth;
pub mod config;
pub mod directory;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
