//! Token claim set and the principal it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::Role;

/// A verified principal, as handed over by the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    /// Stable username-like identifier.
    pub user_name: String,
    pub name: String,
    pub surname: String,
    /// Reference into the role directory.
    pub role_id: String,
    pub is_deleted: bool,
}

/// Claims carried by every bearer token, in wire order.
///
/// The short names (`unique_name`, `family_name`, `nameid`, `role`) are the
/// ones existing consumers of these tokens already read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "unique_name")]
    pub name: String,
    #[serde(rename = "family_name")]
    pub surname: String,
    #[serde(rename = "nameid")]
    pub user_name: String,
    pub role: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub(crate) fn new(
        principal: &Principal,
        role: &Role,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: principal.name.clone(),
            surname: principal.surname.clone(),
            user_name: principal.user_name.clone(),
            role: role.name.clone(),
            user_id: principal.id,
            is_deleted: principal.is_deleted,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// True when both claim sets describe the same identity and role,
    /// ignoring the time-bound fields.
    pub fn same_identity(&self, other: &Claims) -> bool {
        self.name == other.name
            && self.surname == other.surname
            && self.user_name == other.user_name
            && self.role == other.role
            && self.user_id == other.user_id
            && self.is_deleted == other.is_deleted
            && self.iss == other.iss
            && self.aud == other.aud
    }
}
