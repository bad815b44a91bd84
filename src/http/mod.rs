//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, timing log)
//!     → auth::authenticate (attach caller identity)
//!     → security::rate_limit (admit or 429)
//!     → handlers.rs (health, login, me)
//!     → response.rs (error, 429 and problem bodies)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
