//! User and role directory.
//!
//! # Data Flow
//! ```text
//! login handler
//!     → PrincipalDirectory::find_by_email (user record + password hash)
//!     → CredentialIssuer
//!         → RoleDirectory::find_role (role name for the token)
//! ```
//!
//! # Design Decisions
//! - Both lookups are traits so the gateway can sit in front of any user store
//! - `Ok(None)` means "no such record"; `Err` means the store itself failed
//! - The bundled implementation is in-memory and seeded from configuration

mod memory;

pub use memory::InMemoryDirectory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Principal;

/// Failure of the backing store, as opposed to a missing record.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// A role record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub is_deleted: bool,
}

/// A user record as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub name: String,
    pub surname: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role_id: String,
    pub is_deleted: bool,
}

impl UserRecord {
    /// The claim-worthy part of the record.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            user_name: self.user_name.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            role_id: self.role_id.clone(),
            is_deleted: self.is_deleted,
        }
    }
}

#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn find_role(&self, role_id: &str) -> Result<Option<Role>, DirectoryError>;
}

#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError>;
}
