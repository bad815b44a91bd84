//! Credential issuance and bearer authentication.
//!
//! # Data Flow
//! ```text
//! Login (after password verification):
//!     Principal
//!     → issuer.rs (resolve role, build claims, sign HS256)
//!     → compact token returned to caller
//!
//! Later requests:
//!     Authorization: Bearer <token>
//!     → verify.rs (signature, iss, aud, exp, nbf)
//!     → CallerIdentity in request extensions
//!     → rate limit partition + handlers
//! ```
//!
//! # Design Decisions
//! - Tokens are self-contained; no revocation list, no refresh
//! - An unresolvable role is an explicit error, never a panic
//! - Verification annotates, it does not reject; handlers decide

pub mod claims;
pub mod error;
pub mod issuer;
pub mod password;
pub mod verify;

pub use claims::{Claims, Principal};
pub use error::AuthError;
pub use issuer::{CredentialIssuer, IssuedToken, TokenSettings};
pub use verify::{authenticate, CallerIdentity, TokenVerifier};
